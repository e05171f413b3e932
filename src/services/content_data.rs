//! Wiping the embedded content's persistent partition

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{error, info, warn};

/// Result of a wipe; never an error, so callers can report it as-is
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearOutcome {
    pub success: bool,
    pub message: String,
}

impl ClearOutcome {
    fn ok(message: impl Into<String>) -> Self {
        Self { success: true, message: message.into() }
    }

    fn failed(message: impl Into<String>) -> Self {
        Self { success: false, message: message.into() }
    }
}

/// Partition holding the content view's cookies, local storage and databases
pub fn content_data_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("Partitions").join("messenger")
}

/// Recursively delete the content partition
pub async fn clear_content_data(dir: &Path) -> ClearOutcome {
    info!("Clearing content data at {}", dir.display());

    match fs::metadata(dir).await {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => {
            warn!("{} is not a directory", dir.display());
            return ClearOutcome::failed("Content data path is not a directory");
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            info!("Content data directory not found");
            return ClearOutcome::failed("Content data directory not found");
        }
        Err(e) => {
            error!("Failed to inspect content data: {}", e);
            return ClearOutcome::failed(format!("Clearing failed: {}", e));
        }
    }

    match fs::remove_dir_all(dir).await {
        Ok(()) => {
            info!("Content data cleared");
            ClearOutcome::ok("Content data cleared, restart to sign in again")
        }
        Err(e) => {
            error!("Failed to clear content data: {}", e);
            ClearOutcome::failed(format!("Clearing failed: {}", e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn removes_partition_tree() {
        let root = tempfile::tempdir().unwrap();
        let dir = content_data_dir(root.path());
        std::fs::create_dir_all(dir.join("IndexedDB")).unwrap();
        std::fs::write(dir.join("Local Storage"), b"session").unwrap();

        let outcome = clear_content_data(&dir).await;
        assert!(outcome.success, "{}", outcome.message);
        assert!(!dir.exists());
    }

    #[tokio::test]
    async fn missing_partition_is_reported() {
        let root = tempfile::tempdir().unwrap();
        let outcome = clear_content_data(&content_data_dir(root.path())).await;
        assert!(!outcome.success);
        assert!(outcome.message.contains("not found"));
    }
}
