//! Durable word detail cache over a [`KvStore`].
//!
//! Values are JSON-encoded [`WordDetails`] under `word:<term>`. Reads accept
//! both a JSON object and a JSON string containing one (values written by
//! other clients are sometimes double-encoded). Anything that fails the shape
//! check is treated as a miss rather than an error.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use super::memory::MemoryStore;
use super::store::KvStore;
use super::upstash::UpstashStore;
use crate::config::Config;
use crate::details::{looks_like_details, WordDetails};
use crate::error::{Result, TangoError};

/// Cache key for a term: `word:` + trimmed, lower-cased term.
pub fn cache_key_for_word(word: &str) -> String {
    format!("word:{}", word.trim().to_lowercase())
}

#[derive(Clone)]
pub struct WordCache {
    store: Option<Arc<dyn KvStore>>,
    ttl_secs: u64,
}

impl std::fmt::Debug for WordCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WordCache")
            .field("store", &self.store.as_ref().map(|s| s.name()))
            .field("ttl_secs", &self.ttl_secs)
            .finish()
    }
}

impl WordCache {
    pub fn new(store: Arc<dyn KvStore>, ttl_secs: u64) -> Self {
        Self {
            store: Some(store),
            ttl_secs,
        }
    }

    /// A cache with no backing store; every operation reports it is not configured.
    pub fn unconfigured() -> Self {
        Self {
            store: None,
            ttl_secs: 0,
        }
    }

    /// Pick the backing store from config: Upstash when configured, else process
    /// memory if `cache.memory_fallback` is set, else none.
    pub fn from_config(config: &Config) -> Result<Self> {
        let ttl_secs = config.cache_ttl_secs();
        if let Some(upstash) = UpstashStore::from_config(&config.cache)? {
            info!(ttl_secs, "Durable word cache: upstash");
            return Ok(Self::new(Arc::new(upstash), ttl_secs));
        }
        if config.cache.memory_fallback {
            info!(ttl_secs, "Durable word cache: memory (Upstash not configured)");
            return Ok(Self::new(Arc::new(MemoryStore::new()), ttl_secs));
        }
        warn!("Upstash is not configured; every lookup will generate");
        Ok(Self::unconfigured())
    }

    pub fn is_configured(&self) -> bool {
        self.store.is_some()
    }

    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }

    fn store(&self) -> Result<&Arc<dyn KvStore>> {
        self.store
            .as_ref()
            .ok_or_else(|| TangoError::Config("cache store is not configured".into()))
    }

    /// Read cached details for a term. Malformed values are a miss.
    pub async fn get_details(&self, word: &str) -> Result<Option<WordDetails>> {
        let key = cache_key_for_word(word);
        let Some(raw) = self.store()?.get(&key).await? else {
            return Ok(None);
        };
        let details = decode(&raw);
        if details.is_none() {
            debug!(key = %key, "Ignoring malformed cached word details");
        }
        Ok(details)
    }

    /// Write details for a term with the configured expiry.
    pub async fn set_details(&self, word: &str, details: &WordDetails) -> Result<()> {
        let key = cache_key_for_word(word);
        let json = serde_json::to_string(details)?;
        self.store()?.set_ex(&key, &json, self.ttl_secs).await
    }

    pub async fn invalidate(&self, word: &str) -> Result<()> {
        self.store()?.del(&cache_key_for_word(word)).await
    }
}

fn decode(raw: &str) -> Option<WordDetails> {
    let mut value: Value = serde_json::from_str(raw).ok()?;
    if let Value::String(inner) = &value {
        value = serde_json::from_str(inner).ok()?;
    }
    if !looks_like_details(&value) {
        return None;
    }
    serde_json::from_value(value).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryStore;
    use crate::details::Meaning;

    fn cache() -> (Arc<MemoryStore>, WordCache) {
        let store = Arc::new(MemoryStore::new());
        let cache = WordCache::new(store.clone(), 3600);
        (store, cache)
    }

    fn sample() -> WordDetails {
        WordDetails {
            word: "accept".into(),
            pronunciation: "/əkˈsept/".into(),
            meanings: vec![Meaning {
                part_of_speech: "動詞".into(),
                meaning: "受け入れる".into(),
                detailed_meanings: vec![],
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_cache_key_normalizes_word() {
        assert_eq!(cache_key_for_word("  Accept "), "word:accept");
        assert_eq!(cache_key_for_word("bid"), "word:bid");
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let (_, cache) = cache();
        cache.set_details("accept", &sample()).await.unwrap();
        let got = cache.get_details("ACCEPT").await.unwrap();
        assert_eq!(got, Some(sample()));
    }

    #[tokio::test]
    async fn test_get_miss() {
        let (_, cache) = cache();
        assert!(cache.get_details("bid").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_double_encoded_value_is_accepted() {
        let (store, cache) = cache();
        let inner = serde_json::to_string(&sample()).unwrap();
        let outer = serde_json::to_string(&inner).unwrap();
        store.set_ex("word:accept", &outer, 60).await.unwrap();
        assert_eq!(cache.get_details("accept").await.unwrap(), Some(sample()));
    }

    #[tokio::test]
    async fn test_malformed_values_are_misses() {
        let (store, cache) = cache();
        store.set_ex("word:a", "{not json", 60).await.unwrap();
        store.set_ex("word:b", r#"{"word":"b"}"#, 60).await.unwrap();
        store
            .set_ex("word:c", r#"{"word":"c","meanings":"oops"}"#, 60)
            .await
            .unwrap();
        store
            .set_ex("word:d", r#"{"word":"d","meanings":[{"partOfSpeech":7}]}"#, 60)
            .await
            .unwrap();
        for w in ["a", "b", "c", "d"] {
            assert!(cache.get_details(w).await.unwrap().is_none(), "{w}");
        }
    }

    #[tokio::test]
    async fn test_partial_value_passing_shape_check_is_hit() {
        let (store, cache) = cache();
        store
            .set_ex("word:e", r#"{"word":"e","meanings":[]}"#, 60)
            .await
            .unwrap();
        let got = cache.get_details("e").await.unwrap().unwrap();
        assert_eq!(got.word, "e");
        assert!(got.synonyms.is_empty());
    }

    #[tokio::test]
    async fn test_invalidate() {
        let (_, cache) = cache();
        cache.set_details("accept", &sample()).await.unwrap();
        cache.invalidate("accept").await.unwrap();
        assert!(cache.get_details("accept").await.unwrap().is_none());
    }

    #[test]
    fn test_from_config_selects_store() {
        let mut config = Config::default();
        let cache = WordCache::from_config(&config).unwrap();
        assert!(cache.is_configured());
        assert_eq!(cache.ttl_secs(), 30 * 24 * 60 * 60);
        assert_eq!(cache.store.as_ref().unwrap().name(), "memory");

        config.cache.memory_fallback = false;
        assert!(!WordCache::from_config(&config).unwrap().is_configured());

        config.cache.upstash_url = Some("https://example.upstash.io".into());
        config.cache.upstash_token = Some("tok".into());
        let cache = WordCache::from_config(&config).unwrap();
        assert_eq!(cache.store.as_ref().unwrap().name(), "upstash");
    }

    #[tokio::test]
    async fn test_unconfigured_reports_config_error() {
        let cache = WordCache::unconfigured();
        assert!(!cache.is_configured());
        let err = cache.get_details("bid").await.unwrap_err();
        assert!(matches!(err, TangoError::Config(_)));
        assert_eq!(err.to_string(), "cache store is not configured");
        assert!(cache.set_details("bid", &sample()).await.is_err());
    }
}
