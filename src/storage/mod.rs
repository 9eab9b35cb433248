//! Storage layer for session tokens, consumed nonces, and the campaign document.
//!
//! Tokens and nonces are JSON records in a key-value store with per-record
//! expiry (`KvStore`). The campaign collection is a single TOML document in
//! blob storage.

pub mod blob;
pub mod campaign;
pub mod memory;
pub mod nonce;
pub mod redis_kv;
pub mod token;

pub use campaign::CampaignRepository;
pub use memory::MemoryKv;
pub use nonce::NonceLedger;
pub use redis_kv::RedisKv;
pub use token::TokenStore;

use async_trait::async_trait;

/// Error type for key-value store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Key-value store with per-record expiry.
///
/// A single key read or write is atomic; there are no cross-key
/// transactions.
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write `value` under `key`, replacing any previous value, expiring
    /// after `ttl_secs`.
    async fn put(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), StoreError>;

    /// Returns true if the key existed.
    async fn delete(&self, key: &str) -> Result<bool, StoreError>;

    async fn exists(&self, key: &str) -> Result<bool, StoreError>;
}

/// Current Unix time in seconds.
pub(crate) fn unix_now() -> i64 {
    chrono::Utc::now().timestamp()
}
