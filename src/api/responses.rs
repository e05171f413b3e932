//! API request and response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{control::StatusSnapshot, state::DigitOutcome};

/// Response for transition endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl ApiResponse {
    pub fn new(success: bool, message: impl Into<String>) -> Self {
        Self {
            success,
            message: message.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn ok(message: impl Into<String>) -> Self {
        Self::new(true, message)
    }

    pub fn refused(message: impl Into<String>) -> Self {
        Self::new(false, message)
    }
}

/// Error body shown inline next to the control that triggered it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub timestamp: DateTime<Utc>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasscodeBody {
    pub passcode: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdleTimeoutBody {
    pub seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DigitBody {
    pub digit: char,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DigitResponse {
    pub outcome: DigitOutcome,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyBody {
    pub key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyResponse {
    pub panic_triggered: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DevelopmentResponse {
    pub development: bool,
}

/// Status with server metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    #[serde(flatten)]
    pub status: StatusSnapshot,
    pub uptime: String,
    pub port: u16,
    pub host: String,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
