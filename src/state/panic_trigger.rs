//! Six-fours detector on the embedded content keystream

use tokio::time::{Duration, Instant};
use tracing::debug;

pub const PANIC_SEQUENCE: &str = "444444";
/// A longer pause between keys starts the sequence over
pub const PANIC_KEY_GAP: Duration = Duration::from_secs(3);

#[derive(Debug, Default)]
pub struct PanicTrigger {
    sequence: String,
    last_key: Option<Instant>,
}

impl PanicTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sequence(&self) -> &str {
        &self.sequence
    }

    /// Feed one key name (as reported by the page, e.g. `"4"` or `"Enter"`).
    /// Returns true exactly when the panic sequence completes.
    pub fn feed(&mut self, key: &str, now: Instant) -> bool {
        if let Some(last) = self.last_key {
            if now.saturating_duration_since(last) > PANIC_KEY_GAP {
                self.sequence.clear();
            }
        }
        self.last_key = Some(now);

        if key != "4" {
            self.sequence.clear();
            return false;
        }

        self.sequence.push('4');
        if self.sequence.len() > PANIC_SEQUENCE.len() {
            let excess = self.sequence.len() - PANIC_SEQUENCE.len();
            self.sequence.drain(..excess);
        }
        debug!("Panic sequence length {}", self.sequence.len());

        if self.sequence == PANIC_SEQUENCE {
            self.sequence.clear();
            return true;
        }
        false
    }
}
