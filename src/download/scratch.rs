//! Transient download directory.

use std::path::{Path, PathBuf};

/// Process-wide scratch directory, created lazily and removed once empty.
///
/// Items are processed one at a time, so files in here are never contended.
/// Parallel processing would need a private subdirectory per item.
#[derive(Debug, Clone)]
pub struct ScratchDir {
    root: PathBuf,
}

/// A downloaded artifact waiting to be uploaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScratchFile {
    /// Location on disk
    pub path: PathBuf,
    /// Release asset name
    pub filename: String,
    /// Size in bytes
    pub size: u64,
}

impl ScratchDir {
    /// Use `root` as the scratch directory; nothing is created yet
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Default location under the system temp directory
    pub fn default_location() -> PathBuf {
        std::env::temp_dir().join("kodegen-artifact-cache")
    }

    /// Directory path
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Create the directory if missing
    pub async fn ensure(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.root).await
    }

    /// Delete scratch files, best-effort. Failures are logged, never returned.
    pub async fn remove_files(&self, files: &[ScratchFile]) {
        for file in files {
            match tokio::fs::remove_file(&file.path).await {
                Ok(()) => log::debug!("Cleaned up {}", file.path.display()),
                Err(e) => log::warn!("Failed to clean up {}: {e}", file.path.display()),
            }
        }
    }

    /// Remove the directory if it is empty; any failure is ignored
    pub async fn remove_if_empty(&self) {
        if tokio::fs::remove_dir(&self.root).await.is_ok() {
            log::debug!("Removed scratch directory {}", self.root.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_lifecycle() {
        let tmp = TempDir::new().unwrap();
        let scratch = ScratchDir::new(tmp.path().join("dl"));
        assert!(!scratch.path().exists());

        scratch.ensure().await.unwrap();
        let path = scratch.path().join("a.zip");
        std::fs::write(&path, b"x").unwrap();
        let file = ScratchFile {
            path: path.clone(),
            filename: "a.zip".to_string(),
            size: 1,
        };

        // non-empty: stays
        scratch.remove_if_empty().await;
        assert!(scratch.path().exists());

        scratch.remove_files(&[file.clone()]).await;
        assert!(!path.exists());
        // already gone: logged, not fatal
        scratch.remove_files(&[file]).await;

        scratch.remove_if_empty().await;
        assert!(!scratch.path().exists());
    }
}
