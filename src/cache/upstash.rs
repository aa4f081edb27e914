//! Upstash (hosted Redis) REST backend.
//!
//! Each command is a `POST` of a JSON array (`["SET", key, value, "EX", ttl]`)
//! to the database's REST URL with a bearer token. Replies are
//! `{"result": ...}` on success and `{"error": "..."}` on failure.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::debug;

use super::store::KvStore;
use crate::config::CacheConfig;
use crate::error::{Result, TangoError};

pub struct UpstashStore {
    url: String,
    token: String,
    client: Client,
}

impl std::fmt::Debug for UpstashStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstashStore")
            .field("url", &self.url)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

impl UpstashStore {
    pub fn new(url: &str, token: &str) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;
        Ok(Self {
            url: url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            client,
        })
    }

    /// Build from config. Returns `Ok(None)` unless both URL and token are set.
    pub fn from_config(config: &CacheConfig) -> Result<Option<Self>> {
        match (
            config.upstash_url.as_deref().filter(|s| !s.is_empty()),
            config.upstash_token.as_deref().filter(|s| !s.is_empty()),
        ) {
            (Some(url), Some(token)) => Self::new(url, token).map(Some),
            _ => Ok(None),
        }
    }

    async fn command(&self, args: Value) -> Result<Value> {
        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.token)
            .json(&args)
            .send()
            .await
            .map_err(|e| TangoError::Cache(format!("Upstash request failed: {}", e)))?;

        let status = response.status();
        let body: Value = response
            .json()
            .await
            .map_err(|e| TangoError::Cache(format!("Invalid Upstash response ({status}): {e}")))?;

        if let Some(err) = body.get("error").and_then(Value::as_str) {
            return Err(TangoError::Cache(format!("Upstash error: {}", err)));
        }
        if !status.is_success() {
            return Err(TangoError::Cache(format!("Upstash returned HTTP {}", status)));
        }
        Ok(body.get("result").cloned().unwrap_or(Value::Null))
    }
}

#[async_trait]
impl KvStore for UpstashStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let result = self.command(json!(["GET", key])).await?;
        debug!(key, found = !result.is_null(), "Upstash GET");
        Ok(match result {
            Value::Null => None,
            Value::String(s) => Some(s),
            other => Some(other.to_string()),
        })
    }

    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<()> {
        self.command(json!(["SET", key, value, "EX", ttl_secs.to_string()]))
            .await?;
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<()> {
        self.command(json!(["DEL", key])).await?;
        Ok(())
    }

    fn name(&self) -> &str {
        "upstash"
    }
}
