//! Campaign document persistence.
//!
//! The whole collection lives in one TOML document:
//!
//! ```toml
//! [[campaigns]]
//! id = "c1"
//! token_address = "0xabc"
//! total_amount = 100.0
//! start_date = "2099-01-01"
//! end_date = "2099-01-31"
//! status = "active"
//! ```
//!
//! Every load reads the full document and every save replaces it. There is
//! no locking: concurrent writers race and the last save wins.

use super::blob::{BlobError, FsBlobStore};
use crate::models::{Campaign, CampaignDocument};
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error(transparent)]
    Blob(#[from] BlobError),

    #[error("Campaign document is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("Failed to parse campaign document: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize campaign document: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Debug, Clone)]
pub struct CampaignRepository {
    blobs: FsBlobStore,
    key: String,
}

impl CampaignRepository {
    pub fn new(root: PathBuf, key: String) -> Self {
        CampaignRepository {
            blobs: FsBlobStore::new(root),
            key,
        }
    }

    /// Load the full collection. A missing document is an empty collection.
    pub async fn load(&self) -> Result<Vec<Campaign>, RepositoryError> {
        let Some(bytes) = self.blobs.read(&self.key).await? else {
            return Ok(Vec::new());
        };

        let text = String::from_utf8(bytes)?;
        let document: CampaignDocument = toml::from_str(&text)?;
        Ok(document.campaigns)
    }

    /// Replace the stored document with `campaigns`.
    pub async fn save(&self, campaigns: &[Campaign]) -> Result<(), RepositoryError> {
        let document = CampaignDocument {
            campaigns: campaigns.to_vec(),
        };
        let text = toml::to_string(&document)?;
        self.blobs.write(&self.key, text.as_bytes()).await?;

        tracing::debug!(count = campaigns.len(), key = %self.key, "Campaign document saved");
        Ok(())
    }
}
