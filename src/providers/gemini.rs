//! Native Gemini provider.
//!
//! Speaks the `generateContent` REST endpoint directly with API-key auth.
//!
//! Thinking model support: Gemini 2.5 models may return parts tagged
//! `thought: true`. Those are filtered out and only the final text is returned.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::debug;

use crate::config::GeminiConfig;
use crate::error::{Result, TangoError};

use super::{describe_provider_error, GenerationOptions, TextGenerator};

/// Gemini v1beta REST API base.
pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default model when none is configured.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash-lite";

/// Gemini `generateContent` client that produces word detail JSON.
pub struct GeminiProvider {
    api_key: String,
    model: String,
    api_base: String,
    client: Client,
}

impl std::fmt::Debug for GeminiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiProvider")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl GeminiProvider {
    /// Build a provider against an arbitrary API base (tests, proxies).
    pub fn with_base(api_key: &str, model: &str, api_base: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            api_key: api_key.to_string(),
            model: model.to_string(),
            api_base: api_base.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Build from config. Returns `Ok(None)` when no API key is configured.
    pub fn from_config(config: &GeminiConfig) -> Result<Option<Self>> {
        let Some(key) = config.api_key.as_deref().filter(|k| !k.is_empty()) else {
            return Ok(None);
        };
        let base = config.api_base.as_deref().unwrap_or(GEMINI_API_BASE);
        Self::with_base(key, &config.model, base, Duration::from_secs(config.timeout_secs)).map(Some)
    }

    /// Build a single-turn `generateContent` request body.
    pub fn build_request_body(prompt: &str, options: &GenerationOptions) -> Value {
        let mut generation_config = json!({
            "temperature": options.temperature,
            "maxOutputTokens": options.max_output_tokens,
        });
        if let Some(mime) = &options.response_mime_type {
            generation_config["responseMimeType"] = json!(mime);
        }
        json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": prompt }]
            }],
            "generationConfig": generation_config
        })
    }

    /// Concatenated text of the first candidate, ignoring thought parts when real output exists.
    ///
    /// Falls back to thought text when no final parts exist.
    pub fn extract_text(response: &Value) -> Option<String> {
        let parts = response["candidates"][0]["content"]["parts"].as_array()?;

        let final_parts: Vec<&str> = parts
            .iter()
            .filter(|p| !p["thought"].as_bool().unwrap_or(false))
            .filter_map(|p| p["text"].as_str())
            .collect();

        if !final_parts.is_empty() {
            return Some(final_parts.join(""));
        }

        let thought_parts: Vec<&str> = parts.iter().filter_map(|p| p["text"].as_str()).collect();
        if thought_parts.is_empty() {
            None
        } else {
            Some(thought_parts.join(""))
        }
    }

    /// The candidate's finish reason (`STOP`, `MAX_TOKENS`, ...), if reported.
    pub fn finish_reason(response: &Value) -> Option<&str> {
        response["candidates"][0]["finishReason"].as_str()
    }

    fn api_url(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_base, self.model)
    }
}

#[async_trait]
impl TextGenerator for GeminiProvider {
    async fn generate(&self, prompt: &str, options: &GenerationOptions) -> Result<String> {
        let body = Self::build_request_body(prompt, options);

        debug!(
            model = %self.model,
            max_output_tokens = options.max_output_tokens,
            "Gemini request"
        );

        let response = self
            .client
            .post(self.api_url())
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| TangoError::Provider(format!("Gemini request failed: {}", e)))?;

        let status = response.status();
        if status.is_success() {
            let json: Value = response.json().await.map_err(|e| {
                TangoError::Provider(format!("Failed to parse Gemini response: {}", e))
            })?;

            if let Some(reason) = Self::finish_reason(&json) {
                debug!(finish_reason = reason, "Gemini response finished");
            }

            return Self::extract_text(&json).ok_or_else(|| {
                TangoError::Provider("Gemini response contained no text".to_string())
            });
        }

        let error_text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<Value>(&error_text)
            .ok()
            .and_then(|v| v["error"]["message"].as_str().map(String::from))
            .unwrap_or(error_text);

        Err(TangoError::Provider(format!(
            "Gemini API error: {}",
            describe_provider_error(status.as_u16(), &message)
        )))
    }

    fn name(&self) -> &str {
        "gemini-native"
    }

    fn model(&self) -> &str {
        &self.model
    }
}
