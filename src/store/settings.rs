//! Settings record and its JSON-backed store

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{debug, info, warn};

use crate::error::SettingsError;

pub const DEFAULT_PASSCODE: &str = "1209";
pub const DEFAULT_IDLE_TIMEOUT_SECONDS: u64 = 60;
/// Typing this on the calculator wipes everything, so it can never be a passcode
pub const RESERVED_PANIC_CODE: &str = "4444";

const CONFIG_FILE_NAME: &str = "config.json";

/// Persisted configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default = "default_passcode")]
    pub passcode: String,
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_seconds: u64,
}

fn default_passcode() -> String {
    DEFAULT_PASSCODE.to_string()
}

fn default_idle_timeout() -> u64 {
    DEFAULT_IDLE_TIMEOUT_SECONDS
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            passcode: default_passcode(),
            idle_timeout_seconds: default_idle_timeout(),
        }
    }
}

impl Settings {
    /// Replace a passcode that breaks the 4-digit / non-reserved rule with the default
    fn sanitized(mut self) -> Self {
        if let Err(e) = validate_passcode(&self.passcode) {
            warn!("Stored passcode rejected ({}), falling back to default", e);
            self.passcode = default_passcode();
        }
        self
    }
}

/// Check a candidate passcode: exactly four ASCII digits, not the panic code
pub fn validate_passcode(candidate: &str) -> Result<(), SettingsError> {
    if candidate.len() != 4 || !candidate.bytes().all(|b| b.is_ascii_digit()) {
        return Err(SettingsError::InvalidPasscode);
    }
    if candidate == RESERVED_PANIC_CODE {
        return Err(SettingsError::ReservedPasscode(candidate.to_string()));
    }
    Ok(())
}

/// In-memory settings backed by `<dir>/config.json`
///
/// Every mutation writes the file first and only commits the new value in
/// memory once the write succeeded.
#[derive(Debug)]
pub struct SettingsStore {
    path: PathBuf,
    current: Settings,
}

impl SettingsStore {
    /// Load settings from `dir`, falling back to defaults when the file is
    /// missing or unreadable
    pub async fn open(dir: impl AsRef<Path>) -> Self {
        let path = dir.as_ref().join(CONFIG_FILE_NAME);

        let current = match fs::read_to_string(&path).await {
            Ok(data) => match serde_json::from_str::<Settings>(&data) {
                Ok(settings) => {
                    info!("Settings loaded from {}", path.display());
                    settings.sanitized()
                }
                Err(e) => {
                    warn!("Settings file {} is corrupt ({}), using defaults", path.display(), e);
                    Settings::default()
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("No settings file at {}, using defaults", path.display());
                Settings::default()
            }
            Err(e) => {
                warn!("Failed to read settings from {}: {}, using defaults", path.display(), e);
                Settings::default()
            }
        };

        debug!("Idle timeout: {}s", current.idle_timeout_seconds);
        Self { path, current }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn settings(&self) -> &Settings {
        &self.current
    }

    pub fn passcode(&self) -> &str {
        &self.current.passcode
    }

    pub fn idle_timeout_seconds(&self) -> u64 {
        self.current.idle_timeout_seconds
    }

    /// Validate and persist a new passcode
    pub async fn set_passcode(&mut self, candidate: &str) -> Result<(), SettingsError> {
        validate_passcode(candidate)?;

        let next = Settings {
            passcode: candidate.to_string(),
            ..self.current.clone()
        };
        self.persist(&next).await?;
        self.current = next;

        info!("Passcode updated");
        Ok(())
    }

    /// Persist a new idle timeout; 0 disables idle locking
    pub async fn set_idle_timeout(&mut self, seconds: u64) -> Result<(), SettingsError> {
        let next = Settings {
            idle_timeout_seconds: seconds,
            ..self.current.clone()
        };
        self.persist(&next).await?;
        self.current = next;

        info!("Idle timeout updated to {}s", seconds);
        Ok(())
    }

    /// Delete the settings file and return to defaults
    pub async fn reset(&mut self) -> Result<(), SettingsError> {
        match fs::remove_file(&self.path).await {
            Ok(()) => info!("Settings file {} deleted", self.path.display()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Settings file already absent");
            }
            Err(source) => {
                return Err(SettingsError::Io {
                    operation: "delete",
                    path: self.path.clone(),
                    source,
                });
            }
        }

        self.current = Settings::default();
        info!("Settings reset to defaults");
        Ok(())
    }

    async fn persist(&self, settings: &Settings) -> Result<(), SettingsError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await.map_err(|source| SettingsError::Io {
                operation: "create",
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let data = serde_json::to_string_pretty(settings)?;
        let staging = self.path.with_extension("json.tmp");

        fs::write(&staging, data).await.map_err(|source| SettingsError::Io {
            operation: "write",
            path: staging.clone(),
            source,
        })?;
        fs::rename(&staging, &self.path).await.map_err(|source| SettingsError::Io {
            operation: "replace",
            path: self.path.clone(),
            source,
        })?;

        debug!("Settings written to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passcode_validation() {
        assert!(validate_passcode("0000").is_ok());
        assert!(validate_passcode("9876").is_ok());
        assert!(matches!(validate_passcode("4444"), Err(SettingsError::ReservedPasscode(_))));
        for bad in ["", "123", "12345", "12a4", "１２３４", " 123", "12.4"] {
            assert!(
                matches!(validate_passcode(bad), Err(SettingsError::InvalidPasscode)),
                "{bad:?} should be rejected"
            );
        }
    }

    #[tokio::test]
    async fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::open(dir.path()).await;
        assert_eq!(store.settings(), &Settings::default());
        assert_eq!(store.passcode(), "1209");
        assert_eq!(store.idle_timeout_seconds(), 60);
    }

    #[tokio::test]
    async fn corrupt_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.json"), "{ not json").unwrap();
        let store = SettingsStore::open(dir.path()).await;
        assert_eq!(store.settings(), &Settings::default());
    }

    #[tokio::test]
    async fn partial_file_fills_missing_fields() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.json"), r#"{ "idleTimeoutSeconds": 0 }"#).unwrap();
        let store = SettingsStore::open(dir.path()).await;
        assert_eq!(store.passcode(), "1209");
        assert_eq!(store.idle_timeout_seconds(), 0);
    }

    #[tokio::test]
    async fn stored_reserved_passcode_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("config.json"),
            r#"{ "passcode": "4444", "idleTimeoutSeconds": 30 }"#,
        )
        .unwrap();
        let store = SettingsStore::open(dir.path()).await;
        assert_eq!(store.passcode(), "1209");
        assert_eq!(store.idle_timeout_seconds(), 30);
    }

    #[tokio::test]
    async fn writes_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SettingsStore::open(dir.path()).await;
        store.set_passcode("5678").await.unwrap();
        store.set_idle_timeout(300).await.unwrap();

        let reopened = SettingsStore::open(dir.path()).await;
        assert_eq!(reopened.passcode(), "5678");
        assert_eq!(reopened.idle_timeout_seconds(), 300);

        let raw = std::fs::read_to_string(dir.path().join("config.json")).unwrap();
        assert!(raw.contains("\"idleTimeoutSeconds\": 300"));
    }

    #[tokio::test]
    async fn rejected_passcode_leaves_store_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SettingsStore::open(dir.path()).await;
        store.set_passcode("2468").await.unwrap();

        assert!(store.set_passcode("4444").await.is_err());
        assert!(store.set_passcode("99").await.is_err());
        assert_eq!(store.passcode(), "2468");
        assert_eq!(SettingsStore::open(dir.path()).await.passcode(), "2468");
    }

    #[tokio::test]
    async fn failed_write_keeps_previous_value() {
        let dir = tempfile::tempdir().unwrap();
        // A regular file where the settings directory should be
        let blocker = dir.path().join("blocked");
        std::fs::write(&blocker, b"").unwrap();

        let mut store = SettingsStore::open(&blocker).await;
        let err = store.set_idle_timeout(15).await.unwrap_err();
        assert!(!err.is_validation());
        assert_eq!(store.idle_timeout_seconds(), 60);
    }

    #[tokio::test]
    async fn reset_deletes_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SettingsStore::open(dir.path()).await;
        store.set_passcode("1111").await.unwrap();
        store.set_idle_timeout(5).await.unwrap();

        store.reset().await.unwrap();
        assert_eq!(store.settings(), &Settings::default());
        assert!(!store.path().exists());

        // Resetting twice is fine
        store.reset().await.unwrap();
    }
}
