//! Word detail caching.
//!
//! Two tiers sit in front of generation:
//! - [`DetailCache`]: in-process TTL + LRU map keyed by slug
//! - [`WordCache`]: durable key-value cache over a [`KvStore`] backend
//!   ([`UpstashStore`] in production, [`MemoryStore`] otherwise)

pub mod detail_cache;
pub mod memory;
pub mod store;
pub mod upstash;
pub mod word_cache;

pub use detail_cache::{CacheStats, DetailCache};
pub use memory::MemoryStore;
pub use store::KvStore;
pub use upstash::UpstashStore;
pub use word_cache::{cache_key_for_word, WordCache};
