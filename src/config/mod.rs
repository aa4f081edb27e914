//! Configuration for tango.
//!
//! Loaded from `~/.tango/config.json` when present, then overridden by
//! environment variables (a `.env` file in the working directory is read
//! first by the binary). Every section is `#[serde(default)]`, so a partial
//! file is valid.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Result, TangoError};
use crate::providers::gemini::DEFAULT_GEMINI_MODEL;

/// Default expiry of the durable word cache, in days.
pub const DEFAULT_CACHE_TTL_DAYS: f64 = 30.0;

/// Upper bound on the durable cache TTL: 10 years.
pub const MAX_CACHE_TTL_SECS: u64 = 10 * 365 * 24 * 60 * 60;

/// Default expiry of the in-process detail cache: 7 days.
pub const DEFAULT_MEMORY_TTL_SECS: u64 = 7 * 24 * 60 * 60;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub gemini: GeminiConfig,
    pub cache: CacheConfig,
    pub tts: TtsConfig,
    pub study: StudyConfig,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (default: 127.0.0.1).
    pub bind: String,
    pub port: u16,
    /// Origin allowed by CORS. `None` allows any origin.
    pub cors_origin: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 3000,
            cors_origin: None,
        }
    }
}

/// Gemini generation settings.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub model: String,
    /// Override for the REST base URL.
    pub api_base: Option<String>,
    pub timeout_secs: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_GEMINI_MODEL.to_string(),
            api_base: None,
            timeout_secs: 60,
        }
    }
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &redact(&self.api_key))
            .field("model", &self.model)
            .field("api_base", &self.api_base)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Cache settings for both the in-process and the durable tier.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Upstash REST endpoint of the durable cache.
    pub upstash_url: Option<String>,
    pub upstash_token: Option<String>,
    /// Expiry of durable entries, in days. Fractions are allowed.
    pub ttl_days: f64,
    /// Expiry of in-process entries, in seconds.
    pub memory_ttl_secs: u64,
    /// Capacity of the in-process cache.
    pub memory_max_entries: usize,
    /// Back the durable tier with process memory when Upstash is not configured.
    pub memory_fallback: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            upstash_url: None,
            upstash_token: None,
            ttl_days: DEFAULT_CACHE_TTL_DAYS,
            memory_ttl_secs: DEFAULT_MEMORY_TTL_SECS,
            memory_max_entries: 1000,
            memory_fallback: true,
        }
    }
}

impl std::fmt::Debug for CacheConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheConfig")
            .field("upstash_url", &self.upstash_url)
            .field("upstash_token", &redact(&self.upstash_token))
            .field("ttl_days", &self.ttl_days)
            .field("memory_ttl_secs", &self.memory_ttl_secs)
            .field("memory_max_entries", &self.memory_max_entries)
            .field("memory_fallback", &self.memory_fallback)
            .finish()
    }
}

/// Text-to-speech proxy settings.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TtsConfig {
    pub api_key: Option<String>,
    pub api_base: Option<String>,
}

impl std::fmt::Debug for TtsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtsConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_base", &self.api_base)
            .finish()
    }
}

/// Study flow settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StudyConfig {
    /// Seconds a card stays up before the countdown runs out.
    pub countdown_secs: u64,
    /// Sessions untouched for this long are dropped.
    pub session_idle_secs: u64,
    /// Cap on live study sessions.
    pub max_sessions: usize,
}

impl Default for StudyConfig {
    fn default() -> Self {
        Self {
            countdown_secs: 5,
            session_idle_secs: 24 * 60 * 60,
            max_sessions: 10_000,
        }
    }
}

fn redact(secret: &Option<String>) -> &'static str {
    match secret {
        Some(s) if !s.is_empty() => "[REDACTED]",
        _ => "<unset>",
    }
}

fn valid_ttl_days(days: f64) -> Option<f64> {
    (days.is_finite() && days > 0.0).then_some(days)
}

/// Parse the cache TTL in days; non-positive or unparsable values fall back to the default.
pub fn parse_ttl_days(raw: &str) -> f64 {
    raw.trim()
        .parse::<f64>()
        .ok()
        .and_then(valid_ttl_days)
        .unwrap_or(DEFAULT_CACHE_TTL_DAYS)
}

/// Convert a TTL in days to whole seconds, clamped to `[1, MAX_CACHE_TTL_SECS]`.
pub fn ttl_secs(days: f64) -> u64 {
    let days = valid_ttl_days(days).unwrap_or(DEFAULT_CACHE_TTL_DAYS);
    (days * 86_400.0)
        .round()
        .clamp(1.0, MAX_CACHE_TTL_SECS as f64) as u64
}

impl Config {
    /// Default config file location: `~/.tango/config.json`.
    pub fn path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".tango")
            .join("config.json")
    }

    /// Load from the default path (if present) and apply environment overrides.
    pub fn load() -> Result<Self> {
        let path = Self::path();
        let mut config = if path.exists() {
            Self::load_from_path(&path)?
        } else {
            debug!(path = %path.display(), "No config file, using defaults");
            Self::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse a config file without applying environment overrides.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        serde_json::from_str(&data).map_err(|e| {
            TangoError::Config(format!("Invalid config file {}: {}", path.display(), e))
        })
    }

    /// Apply overrides from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary variable lookup. Empty values are ignored.
    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = var("GEMINI_API_KEY").or_else(|| var("GOOGLE_API_KEY")) {
            self.gemini.api_key = Some(key);
        }
        if let Some(model) = var("TANGO_GEMINI_MODEL") {
            self.gemini.model = model;
        }
        if let Some(url) = var("UPSTASH_REDIS_REST_URL") {
            self.cache.upstash_url = Some(url);
        }
        if let Some(token) = var("UPSTASH_REDIS_REST_TOKEN") {
            self.cache.upstash_token = Some(token);
        }
        if let Some(days) = var("WORD_CACHE_TTL_DAYS") {
            self.cache.ttl_days = parse_ttl_days(&days);
        }
        if let Some(key) = var("TTS_API_KEY") {
            self.tts.api_key = Some(key);
        }
        if let Some(bind) = var("TANGO_BIND") {
            self.server.bind = bind;
        }
        if let Some(port) = var("TANGO_PORT") {
            match port.parse() {
                Ok(p) => self.server.port = p,
                Err(e) => warn!("Ignoring invalid TANGO_PORT '{}': {}", port, e),
            }
        }
        if let Some(origin) = var("TANGO_CORS_ORIGIN") {
            self.server.cors_origin = Some(origin);
        }
    }

    /// Durable cache TTL in seconds.
    pub fn cache_ttl_secs(&self) -> u64 {
        ttl_secs(self.cache.ttl_days)
    }
}
