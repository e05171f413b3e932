//! Messages exchanged between the control loop and the presentation surfaces

use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

use crate::{
    error::{ControlError, SettingsError},
    services::ClearOutcome,
    state::{DigitOutcome, IdleStatus, LockState},
    surfaces::Bounds,
};

/// Which surface produced an input event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Surface {
    HostWindow,
    ContentView,
}

/// Window and content view signals feeding the activity monitor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SurfaceEvent {
    Input { surface: Surface },
    FocusGained,
    FocusLost,
    Minimized,
    Restored,
    Shown,
    Hidden,
    Resized { width: u32, height: u32 },
    ContentNavigated,
    ContentDomReady,
    /// First full load of the embedded content
    ContentLoaded,
    Closed,
}

/// Fire-and-forget notifications from the control loop
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Notification {
    #[serde(rename_all = "camelCase")]
    LockStateChanged { is_locked: bool },
    OpenSettingsRequested,
    SettingsClosed,
    ContentLoaded,
    /// The embedded page should drop its local/session storage and databases
    ContentStorageClearRequested,
    WindowHideRequested,
    EasterEgg,
}

/// Everything the status endpoint reports
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSnapshot {
    #[serde(flatten)]
    pub lock: LockState,
    pub content_bounds: Bounds,
    pub idle: IdleStatus,
    pub development: bool,
}

pub type Reply<T> = oneshot::Sender<T>;

/// Requests handled one at a time by the control loop
#[derive(Debug)]
pub enum Command {
    Unlock { reply: Reply<bool> },
    Lock { reply: Reply<bool> },
    GetPasscode { reply: Reply<String> },
    SetPasscode { passcode: String, reply: Reply<Result<(), SettingsError>> },
    ResetPasscode { reply: Reply<Result<(), SettingsError>> },
    GetIdleTimeout { reply: Reply<u64> },
    SetIdleTimeout { seconds: u64, reply: Reply<Result<(), SettingsError>> },
    Panic { reply: Reply<bool> },
    ClearContentData { reply: Reply<ClearOutcome> },
    IsDevelopmentMode { reply: Reply<bool> },
    DisguiseDigit { digit: char, reply: Reply<Result<DigitOutcome, ControlError>> },
    DisguiseClear { reply: Reply<()> },
    ContentKey { key: String, reply: Reply<bool> },
    Surface { event: SurfaceEvent, reply: Reply<()> },
    OpenSettings { reply: Reply<bool> },
    CloseSettings { reply: Reply<bool> },
    Status { reply: Reply<StatusSnapshot> },
}

impl Command {
    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::Unlock { .. } => "unlock",
            Self::Lock { .. } => "lock",
            Self::GetPasscode { .. } => "get-passcode",
            Self::SetPasscode { .. } => "set-passcode",
            Self::ResetPasscode { .. } => "reset-passcode",
            Self::GetIdleTimeout { .. } => "get-idle-timeout",
            Self::SetIdleTimeout { .. } => "set-idle-timeout",
            Self::Panic { .. } => "panic",
            Self::ClearContentData { .. } => "clear-content-data",
            Self::IsDevelopmentMode { .. } => "is-development",
            Self::DisguiseDigit { .. } => "disguise-digit",
            Self::DisguiseClear { .. } => "disguise-clear",
            Self::ContentKey { .. } => "content-key",
            Self::Surface { .. } => "surface-event",
            Self::OpenSettings { .. } => "open-settings",
            Self::CloseSettings { .. } => "close-settings",
            Self::Status { .. } => "status",
        }
    }
}
