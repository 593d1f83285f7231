use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::routing::ClassificationResult;

pub mod store;

pub use store::{MemoryStore, NoopStore};

#[cfg(feature = "redis-cache")]
pub use store::RedisStore;

pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache store error: {0}")]
    Store(String),
}

/// Key-value store with expiry, `GET key` / `SETEX key ttl value`
/// semantics.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;
}

/// Short-TTL cache of classification results keyed by normalized input
/// text. Store failures never surface: absence, staleness and transport
/// errors all read as a plain miss, so the pipeline stays correct with the
/// cache entirely disabled.
pub struct ResultCache {
    store: Arc<dyn CacheStore>,
    ttl: Duration,
}

impl ResultCache {
    pub fn new(store: Arc<dyn CacheStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    pub fn disabled() -> Self {
        Self::new(Arc::new(NoopStore), DEFAULT_CACHE_TTL)
    }

    fn cache_key(text: &str) -> String {
        format!("classify:{}", text.trim().to_lowercase())
    }

    pub async fn get(&self, text: &str) -> Option<ClassificationResult> {
        let key = Self::cache_key(text);
        match self.store.get(&key).await {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(result) => Some(result),
                Err(e) => {
                    tracing::debug!(key, error = %e, "discarding undecodable cache entry");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(key, error = %e, "cache read skipped");
                None
            }
        }
    }

    pub async fn put(&self, text: &str, result: &ClassificationResult) {
        let key = Self::cache_key(text);
        let raw = match serde_json::to_string(result) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(key, error = %e, "cache write skipped");
                return;
            }
        };
        if let Err(e) = self.store.set_ex(&key, &raw, self.ttl).await {
            tracing::warn!(key, error = %e, "cache write skipped");
        }
    }
}
