//! Redis-backed key-value store.
//!
//! Records are plain strings written with `SET key value EX ttl`, so Redis
//! prunes them on expiry.

use super::{KvStore, StoreError};
use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;

/// Redis store over a shared multiplexed connection.
///
/// The connection is cloned per call; clones share one socket.
#[derive(Clone)]
pub struct RedisKv {
    con: MultiplexedConnection,
}

impl RedisKv {
    pub fn new(con: MultiplexedConnection) -> Self {
        RedisKv { con }
    }

    /// Open a client and verify the connection.
    pub async fn connect(redis_url: &str) -> Result<Self, StoreError> {
        let client = redis::Client::open(redis_url)?;
        let con = client.get_multiplexed_async_connection().await?;
        Ok(RedisKv { con })
    }
}

#[async_trait]
impl KvStore for RedisKv {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut con = self.con.clone();
        let value: Option<String> = con.get(key).await?;
        Ok(value)
    }

    async fn put(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), StoreError> {
        let mut con = self.con.clone();
        con.set_ex::<_, _, ()>(key, value, ttl_secs).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        let mut con = self.con.clone();
        let deleted: i32 = con.del(key).await?;
        Ok(deleted > 0)
    }

    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        let mut con = self.con.clone();
        let exists: bool = con.exists(key).await?;
        Ok(exists)
    }
}
