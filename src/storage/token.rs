//! Session token store.
//!
//! Key pattern: `token:{token}` — `StoredToken` JSON, expiring after the
//! session lifetime. Validation also enforces the lifetime against
//! `issued_at`, deleting stale records it finds.
//!
//! Token records are bearer credentials, so the raw JSON read back from the
//! store is wrapped in `Zeroizing` and cleared after deserialization.

use super::{unix_now, KvStore, StoreError};
use crate::auth::session::generate_session_token;
use crate::models::{Address, StoredToken};
use std::sync::Arc;
use zeroize::Zeroizing;

#[derive(Clone)]
pub struct TokenStore {
    kv: Arc<dyn KvStore>,
    ttl_secs: u64,
}

fn token_key(token: &str) -> String {
    format!("token:{}", token)
}

impl TokenStore {
    pub fn new(kv: Arc<dyn KvStore>, ttl_secs: u64) -> Self {
        TokenStore { kv, ttl_secs }
    }

    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }

    /// Issue and persist a new token for `address`.
    pub async fn issue(&self, address: &Address) -> Result<String, StoreError> {
        self.issue_at(address, unix_now()).await
    }

    pub async fn issue_at(&self, address: &Address, issued_at: i64) -> Result<String, StoreError> {
        let token = generate_session_token(address, issued_at);
        let record = StoredToken {
            token: token.clone(),
            address: address.clone(),
            issued_at,
        };
        let json = Zeroizing::new(serde_json::to_string(&record)?);
        self.kv.put(&token_key(&token), &json, self.ttl_secs).await?;
        Ok(token)
    }

    /// Resolve a token to its bound address.
    ///
    /// Returns `None` for unknown tokens and for tokens older than the
    /// session lifetime.
    pub async fn validate(&self, token: &str) -> Result<Option<Address>, StoreError> {
        self.validate_at(token, unix_now()).await
    }

    pub async fn validate_at(&self, token: &str, now: i64) -> Result<Option<Address>, StoreError> {
        let key = token_key(token);
        let Some(data) = self.kv.get(&key).await? else {
            return Ok(None);
        };

        // Wrap the JSON string in Zeroizing to clear it after use
        let zeroizing_data = Zeroizing::new(data);
        let record: StoredToken = serde_json::from_str(&zeroizing_data)?;

        if is_expired(record.issued_at, now, self.ttl_secs) {
            self.kv.delete(&key).await?;
            tracing::info!(action = "token_expired", address = %record.address, "Session token expired");
            return Ok(None);
        }

        Ok(Some(record.address))
    }
}

/// A token is expired strictly after `ttl_secs` have elapsed.
fn is_expired(issued_at: i64, now: i64, ttl_secs: u64) -> bool {
    now.saturating_sub(issued_at) > ttl_secs as i64
}
