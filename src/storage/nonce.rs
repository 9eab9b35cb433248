//! Consumed-signature ledger.
//!
//! Key pattern: `nonce:{digest}` — `StoredNonce` JSON, expires after the
//! nonce retention window.

use super::{unix_now, KvStore, StoreError};
use crate::models::{Address, StoredNonce};
use std::sync::Arc;

#[derive(Clone)]
pub struct NonceLedger {
    kv: Arc<dyn KvStore>,
    ttl_secs: u64,
}

fn nonce_key(nonce: &str) -> String {
    format!("nonce:{}", nonce)
}

impl NonceLedger {
    pub fn new(kv: Arc<dyn KvStore>, ttl_secs: u64) -> Self {
        NonceLedger { kv, ttl_secs }
    }

    /// Whether the nonce has already been used to authenticate.
    ///
    /// Store failures are returned as errors, never as "unused".
    pub async fn is_consumed(&self, nonce: &str) -> Result<bool, StoreError> {
        self.kv.exists(&nonce_key(nonce)).await
    }

    /// Record the nonce as consumed. Re-marking an existing nonce is harmless.
    pub async fn mark_consumed(&self, nonce: &str, address: &Address) -> Result<(), StoreError> {
        let record = StoredNonce {
            nonce: nonce.to_string(),
            address: address.clone(),
            timestamp: unix_now(),
        };
        let json = serde_json::to_string(&record)?;
        self.kv.put(&nonce_key(nonce), &json, self.ttl_secs).await
    }
}
