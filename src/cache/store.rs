use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use super::{CacheError, CacheStore};

/// Process-local TTL store. Default when no shared store is configured;
/// entries do not survive the process and are not visible to peers.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, (String, Instant)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut entries = self.entries.lock().expect("cache mutex poisoned");
        if let Some((value, expires_at)) = entries.get(key) {
            if *expires_at > Instant::now() {
                return Ok(Some(value.clone()));
            }
        }
        entries.remove(key);
        Ok(None)
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let mut entries = self.entries.lock().expect("cache mutex poisoned");
        entries.insert(key.to_string(), (value.to_string(), Instant::now() + ttl));
        Ok(())
    }
}

/// Store that remembers nothing. Every read is a miss, every write is
/// accepted and dropped.
#[derive(Debug, Default)]
pub struct NoopStore;

#[async_trait]
impl CacheStore for NoopStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        Ok(None)
    }

    async fn set_ex(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<(), CacheError> {
        Ok(())
    }
}

#[cfg(feature = "redis-cache")]
pub use redis_store::RedisStore;

#[cfg(feature = "redis-cache")]
mod redis_store {
    use super::*;
    use redis::AsyncCommands;
    use redis::aio::MultiplexedConnection;
    use tokio::sync::OnceCell;

    /// Shared key-value store over Redis `GET` / `SETEX`. The connection is
    /// established on first use and multiplexed across callers.
    pub struct RedisStore {
        client: redis::Client,
        connection: OnceCell<MultiplexedConnection>,
    }

    impl RedisStore {
        pub fn connect(url: &str) -> Result<Self, CacheError> {
            let client =
                redis::Client::open(url).map_err(|e| CacheError::Store(e.to_string()))?;
            Ok(Self {
                client,
                connection: OnceCell::new(),
            })
        }

        async fn connection(&self) -> Result<MultiplexedConnection, CacheError> {
            let connection = self
                .connection
                .get_or_try_init(|| async {
                    self.client
                        .get_multiplexed_async_connection()
                        .await
                        .map_err(|e| CacheError::Store(e.to_string()))
                })
                .await?;
            Ok(connection.clone())
        }
    }

    #[async_trait]
    impl CacheStore for RedisStore {
        async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
            let mut connection = self.connection().await?;
            connection
                .get(key)
                .await
                .map_err(|e| CacheError::Store(e.to_string()))
        }

        async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
            let mut connection = self.connection().await?;
            connection
                .set_ex(key, value, ttl.as_secs())
                .await
                .map_err(|e| CacheError::Store(e.to_string()))
        }
    }
}
