//! Lock flag and the facts that gate the lock affordances

use serde::{Deserialize, Serialize};

/// Why a lock transition was requested
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockReason {
    /// Lock command, menu entry or boss key
    User,
    IdleTimeout,
    Panic,
}

impl LockReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::IdleTimeout => "idle timeout",
            Self::Panic => "panic",
        }
    }
}

/// Single source of truth for the disguise
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockState {
    pub unlocked: bool,
    pub content_loaded: bool,
    pub settings_open: bool,
}

impl LockState {
    /// Starts locked with nothing loaded
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_locked(&self) -> bool {
        !self.unlocked
    }

    /// Flip to locked. Returns false when already locked.
    pub fn lock(&mut self) -> bool {
        if !self.unlocked {
            return false;
        }
        self.unlocked = false;
        true
    }

    /// Flip to unlocked. Returns false when already unlocked.
    pub fn unlock(&mut self) -> bool {
        if self.unlocked {
            return false;
        }
        self.unlocked = true;
        true
    }

    /// Close the settings overlay; returns whether it was open
    pub fn close_settings(&mut self) -> bool {
        std::mem::replace(&mut self.settings_open, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_locked() {
        let state = LockState::new();
        assert!(state.is_locked());
        assert!(!state.content_loaded);
    }

    #[test]
    fn transitions_fold_repeats() {
        let mut state = LockState::new();
        assert!(!state.lock());
        assert!(state.unlock());
        assert!(!state.unlock());
        assert!(state.lock());
        assert!(!state.lock());
        assert!(state.is_locked());
    }

    #[test]
    fn close_settings_reports_previous_state() {
        let mut state = LockState::new();
        assert!(!state.close_settings());
        state.settings_open = true;
        assert!(state.close_settings());
        assert!(!state.settings_open);
    }
}
