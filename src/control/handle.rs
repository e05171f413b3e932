//! Cloneable async front end to the control loop

use tokio::sync::{broadcast, mpsc, oneshot};

use crate::{
    error::ControlError,
    services::ClearOutcome,
    state::DigitOutcome,
};
use super::command::{Command, Notification, Reply, StatusSnapshot, SurfaceEvent};

/// Sends commands to the control loop and awaits their replies.
///
/// Every method resolves once the loop has applied the request, so the lock
/// decision is visible to the next caller even if a follow-up effect is still
/// being written to disk by the loop.
#[derive(Debug, Clone)]
pub struct ControlHandle {
    commands: mpsc::Sender<Command>,
    notifications: broadcast::Sender<Notification>,
}

impl ControlHandle {
    pub(crate) fn new(
        commands: mpsc::Sender<Command>,
        notifications: broadcast::Sender<Notification>,
    ) -> Self {
        Self { commands, notifications }
    }

    /// Subscribe to lock/settings notifications
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.notifications.subscribe()
    }

    async fn request<T>(&self, build: impl FnOnce(Reply<T>) -> Command) -> Result<T, ControlError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(build(reply))
            .await
            .map_err(|_| ControlError::Closed)?;
        response.await.map_err(|_| ControlError::Closed)
    }

    pub async fn unlock(&self) -> Result<bool, ControlError> {
        self.request(|reply| Command::Unlock { reply }).await
    }

    pub async fn lock(&self) -> Result<bool, ControlError> {
        self.request(|reply| Command::Lock { reply }).await
    }

    pub async fn passcode(&self) -> Result<String, ControlError> {
        self.request(|reply| Command::GetPasscode { reply }).await
    }

    pub async fn set_passcode(&self, passcode: impl Into<String>) -> Result<(), ControlError> {
        let passcode = passcode.into();
        self.request(|reply| Command::SetPasscode { passcode, reply })
            .await?
            .map_err(ControlError::from)
    }

    pub async fn reset_passcode(&self) -> Result<(), ControlError> {
        self.request(|reply| Command::ResetPasscode { reply })
            .await?
            .map_err(ControlError::from)
    }

    pub async fn idle_timeout(&self) -> Result<u64, ControlError> {
        self.request(|reply| Command::GetIdleTimeout { reply }).await
    }

    pub async fn set_idle_timeout(&self, seconds: u64) -> Result<(), ControlError> {
        self.request(|reply| Command::SetIdleTimeout { seconds, reply })
            .await?
            .map_err(ControlError::from)
    }

    pub async fn panic(&self) -> Result<bool, ControlError> {
        self.request(|reply| Command::Panic { reply }).await
    }

    pub async fn clear_content_data(&self) -> Result<ClearOutcome, ControlError> {
        self.request(|reply| Command::ClearContentData { reply }).await
    }

    pub async fn is_development_mode(&self) -> Result<bool, ControlError> {
        self.request(|reply| Command::IsDevelopmentMode { reply }).await
    }

    /// Feed one calculator digit into the passcode buffer
    pub async fn disguise_digit(&self, digit: char) -> Result<DigitOutcome, ControlError> {
        self.request(|reply| Command::DisguiseDigit { digit, reply }).await?
    }

    pub async fn disguise_clear(&self) -> Result<(), ControlError> {
        self.request(|reply| Command::DisguiseClear { reply }).await
    }

    /// Feed one key from the embedded content keystream; true if panic fired
    pub async fn content_key(&self, key: impl Into<String>) -> Result<bool, ControlError> {
        let key = key.into();
        self.request(|reply| Command::ContentKey { key, reply }).await
    }

    pub async fn surface_event(&self, event: SurfaceEvent) -> Result<(), ControlError> {
        self.request(|reply| Command::Surface { event, reply }).await
    }

    pub async fn open_settings(&self) -> Result<bool, ControlError> {
        self.request(|reply| Command::OpenSettings { reply }).await
    }

    pub async fn close_settings(&self) -> Result<bool, ControlError> {
        self.request(|reply| Command::CloseSettings { reply }).await
    }

    pub async fn status(&self) -> Result<StatusSnapshot, ControlError> {
        self.request(|reply| Command::Status { reply }).await
    }
}
