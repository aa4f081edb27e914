//! Word detail resolution: in-process cache → durable cache → generation.
//!
//! Generation runs a two-step prompt ladder. The first attempt asks for the
//! full object with a 1024-token budget; if its output cannot be parsed
//! (usually because it was cut off), the second attempt doubles the budget
//! and tells the model to shorten lists and keep the JSON complete.
//!
//! Cache failures never fail a lookup: a broken durable tier degrades to
//! generating every time, and a failed write is only logged.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tracing::{debug, error, info, warn};

use crate::cache::{CacheStats, DetailCache, WordCache};
use crate::catalog::WordCatalog;
use crate::config::Config;
use crate::details::{normalize, parse_json_from_text, WordDetails};
use crate::error::{Result, TangoError};
use crate::providers::{GeminiProvider, GenerationOptions, TextGenerator};

const PROMPT_TEMPLATE: &str = r#"
Return ONLY a JSON object for "${word}" with the following fields:
{
  "word": "${word}",
  "pronunciation": "IPA",
  "meanings": [
    {
      "partOfSpeech": "品詞",
      "meaning": "日本語の要約（1〜3文、頻度順）",
      "detailedMeanings": [
        {
          "number": 1,
          "definition": "短い日本語定義",
          "example": "英語例文",
          "exampleJapanese": "日本語訳",
          "context": "使用場面",
          "frequency": "高/中/低",
          "synonyms": ["..."],
          "grammarPattern": "代表的な文型"
        }
      ]
    }
  ],
  "wordForms": [{ "form": "xxxx", "type": "語形" }],
  "synonyms": ["..."],
  "nuance": "1〜2文で簡潔に",
  "toeicExamples": [
    { "english": "English sentence", "japanese": "日本語訳" }
  ],
  "englishDefinition": "短い英語定義",
  "japaneseTranslation": "日本語訳"
}

Constraints:
- meanings は品詞ごとに1〜2文で簡潔に
- 語形変化は最大5件、類義語は最大5件、toeicExamples は3〜5件
- 語源・使用注意・地域差などの付加情報は含めない
- JSON以外のテキストは出力しない
"#;

const COMPACT_SUFFIX: &str = "\n\nIMPORTANT:\n\
- Output MUST be a single complete JSON object.\n\
- If output would be long, reduce toeicExamples to 3 and synonyms to 3.\n\
- Keep JSON valid and complete (no truncation).\n";

/// Where a resolved detail came from. Rendered as the `X-Cache` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    /// In-process cache.
    Memory,
    /// Durable cache.
    Hit,
    /// Generated; the durable cache was consulted and missed.
    Miss,
    /// Generated; the durable cache could not be read.
    Bypass,
}

impl CacheStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Memory => "MEMORY",
            Self::Hit => "HIT",
            Self::Miss => "MISS",
            Self::Bypass => "BYPASS",
        }
    }
}

/// A successfully resolved word detail.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub details: WordDetails,
    pub status: CacheStatus,
    /// Wall time spent generating, when generation ran.
    pub generation_time: Option<Duration>,
}

/// The base prompt for a term.
pub fn build_prompt(term: &str) -> String {
    PROMPT_TEMPLATE.replace("${word}", term)
}

/// Ordered generation attempts for a term.
pub fn prompt_ladder(term: &str) -> Vec<(String, GenerationOptions)> {
    let base = build_prompt(term);
    vec![
        (base.clone(), GenerationOptions::json(1024)),
        (base + COMPACT_SUFFIX, GenerationOptions::json(2048)),
    ]
}

/// Run the prompt ladder until one attempt yields parseable details.
pub async fn generate_details(generator: &dyn TextGenerator, term: &str) -> Result<WordDetails> {
    let mut last_error = None;
    for (attempt, (prompt, options)) in prompt_ladder(term).into_iter().enumerate() {
        let outcome = match generator.generate(&prompt, &options).await {
            Ok(text) => parse_json_from_text(&text).map(|raw| normalize(term, &raw)),
            Err(e) => Err(e),
        };
        match outcome {
            Ok(details) => return Ok(details),
            Err(e) => {
                warn!(
                    term,
                    attempt = attempt + 1,
                    max_output_tokens = options.max_output_tokens,
                    error = %e,
                    "Word detail generation attempt failed"
                );
                last_error = Some(e);
            }
        }
    }
    Err(last_error.unwrap_or_else(|| {
        TangoError::Generation("Failed to generate a valid JSON response from Gemini".into())
    }))
}

pub struct DetailResolver {
    catalog: Arc<WordCatalog>,
    memory: Mutex<DetailCache>,
    store: WordCache,
    generator: Option<Arc<dyn TextGenerator>>,
    /// Per-slug locks so concurrent misses share one generation.
    inflight: DashMap<String, Arc<tokio::sync::Mutex<()>>>,
}

impl DetailResolver {
    pub fn new(
        catalog: Arc<WordCatalog>,
        memory: DetailCache,
        store: WordCache,
        generator: Option<Arc<dyn TextGenerator>>,
    ) -> Self {
        Self {
            catalog,
            memory: Mutex::new(memory),
            store,
            generator,
            inflight: DashMap::new(),
        }
    }

    /// Wire all three tiers from config. A missing Gemini key is not an error
    /// here; lookups that need generation fail instead.
    pub fn from_config(config: &Config, catalog: Arc<WordCatalog>) -> Result<Self> {
        let memory = DetailCache::new(
            config.cache.memory_ttl_secs,
            config.cache.memory_max_entries,
        );
        let store = WordCache::from_config(config)?;
        let generator: Option<Arc<dyn TextGenerator>> =
            match GeminiProvider::from_config(&config.gemini)? {
                Some(provider) => {
                    info!(model = %config.gemini.model, "Word detail generation enabled");
                    Some(Arc::new(provider))
                }
                None => {
                    warn!("GEMINI_API_KEY is not configured; uncached words cannot be generated");
                    None
                }
            };
        Ok(Self::new(catalog, memory, store, generator))
    }

    pub fn catalog(&self) -> &WordCatalog {
        &self.catalog
    }

    pub fn has_generator(&self) -> bool {
        self.generator.is_some()
    }

    pub fn store(&self) -> &WordCache {
        &self.store
    }

    pub fn memory_stats(&self) -> CacheStats {
        self.memory.lock().unwrap_or_else(PoisonError::into_inner).stats()
    }

    fn memory_get(&self, slug: &str) -> Option<WordDetails> {
        self.memory
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(slug)
    }

    fn memory_put(&self, slug: &str, details: WordDetails) {
        self.memory
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .put(slug, details);
    }

    /// Resolve the detail for a slug. `Ok(None)` means the slug is not in the catalog.
    pub async fn resolve(&self, slug: &str) -> Result<Option<Resolved>> {
        let Some(word) = self.catalog.get_by_slug(slug) else {
            return Ok(None);
        };

        if let Some(details) = self.memory_get(slug) {
            debug!(slug, "Detail served from memory");
            return Ok(Some(Resolved {
                details,
                status: CacheStatus::Memory,
                generation_time: None,
            }));
        }

        let lock = self.inflight.entry(slug.to_string()).or_default().clone();
        let _guard = lock.lock().await;

        // Another request may have filled the cache while we waited.
        if let Some(details) = self.memory_get(slug) {
            return Ok(Some(Resolved {
                details,
                status: CacheStatus::Memory,
                generation_time: None,
            }));
        }

        let mut status = CacheStatus::Miss;
        match self.store.get_details(&word.term).await {
            Ok(Some(details)) => {
                debug!(slug, "Detail served from durable cache");
                self.memory_put(slug, details.clone());
                return Ok(Some(Resolved {
                    details,
                    status: CacheStatus::Hit,
                    generation_time: None,
                }));
            }
            Ok(None) => {}
            Err(e) => {
                if self.store.is_configured() {
                    warn!(slug, error = %e, "Failed to read from durable cache");
                } else {
                    debug!(slug, "Durable cache not configured");
                }
                status = CacheStatus::Bypass;
            }
        }

        let generator = self
            .generator
            .as_ref()
            .ok_or_else(|| TangoError::Config("GEMINI_API_KEY is not configured".into()))?;

        let started = Instant::now();
        let details = generate_details(generator.as_ref(), &word.term)
            .await
            .map_err(|e| {
                error!(slug, error = %e, "Failed to generate word details");
                e
            })?;
        let elapsed = started.elapsed();
        info!(
            slug,
            model = generator.model(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Generated word details"
        );

        if self.store.is_configured() {
            if let Err(e) = self.store.set_details(&word.term, &details).await {
                warn!(slug, error = %e, "Failed to write to durable cache");
            }
        }
        self.memory_put(slug, details.clone());

        Ok(Some(Resolved {
            details,
            status,
            generation_time: Some(elapsed),
        }))
    }

    /// Drop a slug from both cache tiers. Returns `false` for unknown slugs.
    pub async fn invalidate(&self, slug: &str) -> Result<bool> {
        let Some(word) = self.catalog.get_by_slug(slug) else {
            return Ok(false);
        };
        self.memory
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(slug);
        if self.store.is_configured() {
            self.store.invalidate(&word.term).await?;
        }
        Ok(true)
    }
}
