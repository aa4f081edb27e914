//! Pronunciation audio via Google Cloud Text-to-Speech.
//!
//! The API returns base64-encoded MP3 in `audioContent`; it is passed through
//! untouched so clients can build a `data:audio/mp3;base64,...` URL.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::debug;

use crate::config::TtsConfig;
use crate::error::{Result, TangoError};

/// Google Cloud TTS REST base.
pub const TTS_API_BASE: &str = "https://texttospeech.googleapis.com";

const VOICE_LANGUAGE: &str = "en-US";
const VOICE_NAME: &str = "en-US-Standard-A";
const SPEAKING_RATE: f64 = 0.95;

/// Turns text into base64-encoded MP3 audio.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str) -> Result<String>;
}

pub struct GoogleTts {
    api_key: String,
    api_base: String,
    client: Client,
}

impl std::fmt::Debug for GoogleTts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleTts")
            .field("api_key", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl GoogleTts {
    pub fn new(api_key: &str, api_base: &str) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self {
            api_key: api_key.to_string(),
            api_base: api_base.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Build from config. Returns `Ok(None)` when no API key is configured.
    pub fn from_config(config: &TtsConfig) -> Result<Option<Self>> {
        let Some(key) = config.api_key.as_deref().filter(|k| !k.is_empty()) else {
            return Ok(None);
        };
        Self::new(key, config.api_base.as_deref().unwrap_or(TTS_API_BASE)).map(Some)
    }

    pub fn build_request_body(text: &str) -> Value {
        json!({
            "input": { "text": text },
            "voice": {
                "languageCode": VOICE_LANGUAGE,
                "name": VOICE_NAME,
            },
            "audioConfig": {
                "audioEncoding": "MP3",
                "speakingRate": SPEAKING_RATE,
            }
        })
    }
}

#[async_trait]
impl SpeechSynthesizer for GoogleTts {
    async fn synthesize(&self, text: &str) -> Result<String> {
        let response = self
            .client
            .post(format!("{}/v1/text:synthesize", self.api_base))
            .query(&[("key", self.api_key.as_str())])
            .json(&Self::build_request_body(text))
            .send()
            .await
            .map_err(|e| TangoError::Speech(format!("TTS request failed: {}", e)))?;

        if !response.status().is_success() {
            debug!(status = response.status().as_u16(), "TTS API returned an error");
            return Err(TangoError::Speech("Failed to synthesize speech".into()));
        }

        let json: Value = response
            .json()
            .await
            .map_err(|e| TangoError::Speech(format!("Invalid TTS response: {}", e)))?;

        json["audioContent"]
            .as_str()
            .filter(|s| !s.is_empty())
            .map(String::from)
            .ok_or_else(|| {
                TangoError::Speech("TTS response did not include audio content".into())
            })
    }
}
