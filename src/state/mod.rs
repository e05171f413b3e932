//! State management module
//!
//! Plain state machines owned by the control loop, plus the handle bundle
//! shared with the HTTP handlers.

pub mod activity;
pub mod app_state;
pub mod lock_state;
pub mod panic_trigger;
pub mod passcode_buffer;

// Re-export main types
pub use activity::{ActivityMonitor, IdleStatus, IDLE_CHECK_INTERVAL};
pub use app_state::AppState;
pub use lock_state::{LockReason, LockState};
pub use panic_trigger::{PanicTrigger, PANIC_KEY_GAP, PANIC_SEQUENCE};
pub use passcode_buffer::{DigitOutcome, PasscodeBuffer, EASTER_EGG_CODE};
