//! Error types shared by the store, the control loop and the HTTP surface

use std::path::PathBuf;
use thiserror::Error;

/// Failures of a settings operation
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("passcode must be exactly 4 digits")]
    InvalidPasscode,
    #[error("passcode {0} is reserved, choose another one")]
    ReservedPasscode(String),
    #[error("failed to {operation} {path}: {source}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode settings: {0}")]
    Encode(#[from] serde_json::Error),
}

impl SettingsError {
    /// Whether the error comes from rejected input rather than the filesystem
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::InvalidPasscode | Self::ReservedPasscode(_))
    }
}

/// Failures surfaced through the control handle
#[derive(Debug, Error)]
pub enum ControlError {
    #[error("control loop is not running")]
    Closed,
    #[error("'{0}' is not a digit")]
    InvalidDigit(char),
    #[error(transparent)]
    Settings(#[from] SettingsError),
}

/// Reasons a control API request is turned away before reaching a handler
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AccessError {
    #[error("missing control token")]
    MissingToken,
    #[error("invalid control token")]
    InvalidToken,
    #[error("origin {0} is not allowed")]
    ForeignOrigin(String),
}
