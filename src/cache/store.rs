//! Key-value store abstraction behind the durable word cache.

use async_trait::async_trait;

use crate::error::Result;

/// Minimal string key-value store with per-key expiry.
///
/// Implementations report transport failures as errors; a missing or expired
/// key is `Ok(None)`.
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write `value` under `key`, expiring after `ttl_secs` seconds.
    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<()>;

    async fn del(&self, key: &str) -> Result<()>;

    /// Backend identifier for logs.
    fn name(&self) -> &str;
}
