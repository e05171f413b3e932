//! Idle countdown bookkeeping
//!
//! The countdown only runs while the content is unlocked, the idle timeout is
//! non-zero and the host window does *not* hold focus. A focused window means
//! the user is presumed present; idle tracking starts once attention moves
//! elsewhere (another app, minimized window).

use std::future;
use serde::{Deserialize, Serialize};
use tokio::time::{sleep_until, Duration, Instant};
use tracing::debug;

/// Period of the idle check while a countdown is armed
pub const IDLE_CHECK_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy)]
struct Countdown {
    next_check: Instant,
}

/// Snapshot of the idle countdown for status reporting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdleStatus {
    pub window_focused: bool,
    pub idle_timeout_seconds: u64,
    pub elapsed_seconds: u64,
    pub remaining_seconds: u64,
    pub timer_active: bool,
}

/// Tracks the last activity and owns the (optional) countdown
#[derive(Debug)]
pub struct ActivityMonitor {
    last_activity: Instant,
    window_focused: bool,
    countdown: Option<Countdown>,
}

impl ActivityMonitor {
    /// The window is assumed focused at startup
    pub fn new() -> Self {
        Self {
            last_activity: Instant::now(),
            window_focused: true,
            countdown: None,
        }
    }

    pub fn has_countdown(&self) -> bool {
        self.countdown.is_some()
    }

    pub fn window_focused(&self) -> bool {
        self.window_focused
    }

    /// Whole seconds since the last recorded activity
    pub fn idle_seconds(&self) -> u64 {
        Instant::now()
            .saturating_duration_since(self.last_activity)
            .as_secs()
    }

    /// Record activity and re-arm the countdown if it should be running
    pub fn reset(&mut self, unlocked: bool, timeout_seconds: u64) {
        self.last_activity = Instant::now();
        self.countdown = None;

        if unlocked && timeout_seconds > 0 && !self.window_focused {
            self.countdown = Some(Countdown {
                next_check: self.last_activity + IDLE_CHECK_INTERVAL,
            });
            debug!("Idle countdown armed ({}s)", timeout_seconds);
        }
    }

    /// Focus gained: the countdown is removed, not paused
    pub fn focus_gained(&mut self) {
        self.window_focused = true;
        if self.countdown.take().is_some() {
            debug!("Window focused - idle countdown cancelled");
        }
    }

    /// Focus lost or window minimized
    pub fn focus_lost(&mut self, unlocked: bool, timeout_seconds: u64) {
        self.window_focused = false;
        self.reset(unlocked, timeout_seconds);
    }

    /// Content was just revealed
    pub fn unlocked(&mut self, timeout_seconds: u64) {
        if !self.window_focused {
            self.reset(true, timeout_seconds);
        }
    }

    /// Drop the countdown; no-op when none is armed
    pub fn cancel(&mut self) {
        if self.countdown.take().is_some() {
            debug!("Idle countdown cancelled");
        }
    }

    /// Resolves at the next scheduled check, or never when no countdown is armed
    pub async fn next_check(&self) {
        match self.countdown {
            Some(countdown) => sleep_until(countdown.next_check).await,
            None => future::pending::<()>().await,
        }
    }

    /// Run one periodic check. Returns true when the idle threshold is reached.
    pub fn check(&mut self, timeout_seconds: u64) -> bool {
        let Some(countdown) = self.countdown.as_mut() else {
            return false;
        };
        countdown.next_check = Instant::now() + IDLE_CHECK_INTERVAL;

        timeout_seconds > 0 && self.idle_seconds() >= timeout_seconds
    }

    pub fn status(&self, timeout_seconds: u64) -> IdleStatus {
        let elapsed_seconds = self.idle_seconds();
        IdleStatus {
            window_focused: self.window_focused,
            idle_timeout_seconds: timeout_seconds,
            elapsed_seconds,
            remaining_seconds: timeout_seconds.saturating_sub(elapsed_seconds),
            timer_active: self.has_countdown(),
        }
    }
}

impl Default for ActivityMonitor {
    fn default() -> Self {
        Self::new()
    }
}
