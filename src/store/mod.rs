//! Persisted configuration
//!
//! Holds the passcode and idle timeout and writes them to a JSON file.

pub mod settings;

pub use settings::{
    validate_passcode, Settings, SettingsStore, DEFAULT_IDLE_TIMEOUT_SECONDS, DEFAULT_PASSCODE,
    RESERVED_PANIC_CODE,
};
