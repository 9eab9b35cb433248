//! Filesystem blob storage.
//!
//! File structure:
//! - `{root}/{key}` — one file per blob
//!
//! Keys are flat file names; anything that could escape `root` is rejected.

use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

/// Error type for blob operations.
#[derive(Debug, thiserror::Error)]
pub enum BlobError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid blob key: {0}")]
    InvalidKey(String),
}

#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
}

/// Reject keys that are empty or contain path components.
pub fn validate_key(key: &str) -> Result<(), BlobError> {
    if key.is_empty() || key == "." || key == ".." || key.contains('/') || key.contains('\\') {
        return Err(BlobError::InvalidKey(key.to_string()));
    }
    Ok(())
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FsBlobStore { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn blob_path(&self, key: &str) -> Result<PathBuf, BlobError> {
        validate_key(key)?;
        Ok(self.root.join(key))
    }

    /// Read a blob. Returns None if it doesn't exist.
    pub async fn read(&self, key: &str) -> Result<Option<Vec<u8>>, BlobError> {
        let path = self.blob_path(key)?;

        match fs::File::open(&path).await {
            Ok(mut file) => {
                let mut content = Vec::new();
                file.read_to_end(&mut content).await?;
                Ok(Some(content))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(BlobError::Io(e)),
        }
    }

    /// Replace a blob's content.
    ///
    /// Writes to a sibling temp file and renames it over the target, so
    /// readers see either the old or the new content.
    pub async fn write(&self, key: &str, content: &[u8]) -> Result<(), BlobError> {
        let path = self.blob_path(key)?;
        fs::create_dir_all(&self.root).await?;

        let temp_path = self.root.join(format!(".{}.tmp", key));
        let mut file = fs::File::create(&temp_path).await?;
        file.write_all(content).await?;
        file.sync_all().await?;

        fs::rename(&temp_path, &path).await?;

        Ok(())
    }
}
