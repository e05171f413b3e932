//! Configuration and CLI argument handling

use std::path::PathBuf;
use clap::Parser;

use crate::services::content_data_dir;

/// CLI argument parsing structure
#[derive(Debug, Parser)]
#[command(name = "next-calc")]
#[command(about = "A calculator disguise shell guarding a hidden messaging view")]
#[command(version)]
pub struct Config {
    /// Port of the local control API
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Directory holding config.json and the content partition
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Development mode (exposes DevTools in the menu)
    #[arg(long)]
    pub dev: bool,

    /// Origin of a presentation surface allowed to call the API (repeatable)
    #[arg(long = "allowed-origin", value_name = "ORIGIN")]
    pub allowed_origins: Vec<String>,

    /// Treat hiding the host window as a panic
    #[arg(long)]
    pub panic_on_hide: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    /// `--data-dir`, or the platform config directory
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| {
            dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("next-calc")
        })
    }

    pub fn content_data_dir(&self) -> PathBuf {
        content_data_dir(&self.data_dir())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_bind_locally() {
        let config = Config::try_parse_from(["next-calc"]).unwrap();
        assert_eq!(config.address(), "127.0.0.1:20554");
        assert_eq!(config.log_level(), "info");
        assert!(!config.dev);
        assert!(!config.panic_on_hide);
        assert!(config.allowed_origins.is_empty());
    }

    #[test]
    fn allowed_origins_repeat() {
        let config = Config::try_parse_from([
            "next-calc",
            "--allowed-origin",
            "http://localhost:5173",
            "--allowed-origin",
            "app://next-calc",
        ])
        .unwrap();
        assert_eq!(config.allowed_origins, vec!["http://localhost:5173", "app://next-calc"]);
    }

    #[test]
    fn data_dir_override() {
        let config = Config::try_parse_from(["next-calc", "--data-dir", "/tmp/calc", "-v"]).unwrap();
        assert_eq!(config.data_dir(), PathBuf::from("/tmp/calc"));
        assert_eq!(config.content_data_dir(), PathBuf::from("/tmp/calc/Partitions/messenger"));
        assert_eq!(config.log_level(), "debug");
    }
}
