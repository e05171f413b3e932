//! Digit buffer behind the calculator keypad
//!
//! Codes are matched as substrings of the buffer, so the passcode may be
//! buried anywhere in a run of calculator input.

use serde::{Deserialize, Serialize};

use crate::store::RESERVED_PANIC_CODE;

/// Shows an easter egg instead of unlocking
pub const EASTER_EGG_CODE: &str = "0329";

/// What a single digit did to the buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DigitOutcome {
    Pending,
    Unlock,
    EmergencyReset,
    EasterEgg,
}

#[derive(Debug, Clone)]
pub struct PasscodeBuffer {
    digits: String,
    passcode: String,
}

impl PasscodeBuffer {
    pub fn new(passcode: impl Into<String>) -> Self {
        Self {
            digits: String::new(),
            passcode: passcode.into(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.digits
    }

    pub fn len(&self) -> usize {
        self.digits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.digits.is_empty()
    }

    pub fn clear(&mut self) {
        self.digits.clear();
    }

    /// Clear the buffer and pick up the current passcode
    pub fn reload(&mut self, passcode: &str) {
        self.digits.clear();
        self.passcode.clear();
        self.passcode.push_str(passcode);
    }

    /// Append one ASCII digit and evaluate the codes.
    ///
    /// The buffer is cleared whenever a code matches.
    pub fn push(&mut self, digit: char) -> DigitOutcome {
        debug_assert!(digit.is_ascii_digit());
        self.digits.push(digit);

        let outcome = if self.digits.contains(RESERVED_PANIC_CODE) {
            DigitOutcome::EmergencyReset
        } else if self.digits.contains(EASTER_EGG_CODE) {
            DigitOutcome::EasterEgg
        } else if !self.passcode.is_empty() && self.digits.contains(self.passcode.as_str()) {
            DigitOutcome::Unlock
        } else {
            DigitOutcome::Pending
        };

        if outcome != DigitOutcome::Pending {
            self.digits.clear();
            return outcome;
        }

        let window = self.passcode.len().max(1);
        if self.digits.len() > window * 2 {
            let keep_from = self.digits.len() - window;
            self.digits.drain(..keep_from);
        }

        outcome
    }
}
