//! Text generation backends.
//!
//! The resolver only needs "prompt in, text out"; [`TextGenerator`] is that
//! seam. [`gemini::GeminiProvider`] is the production implementation.

pub mod gemini;

use async_trait::async_trait;

use crate::error::Result;

pub use gemini::GeminiProvider;

/// Per-call generation settings.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationOptions {
    pub max_output_tokens: u32,
    pub temperature: f32,
    /// Ask the model for a specific output MIME type (e.g. `application/json`).
    pub response_mime_type: Option<String>,
}

impl GenerationOptions {
    /// JSON-mode options with the given output budget.
    pub fn json(max_output_tokens: u32) -> Self {
        Self {
            max_output_tokens,
            temperature: 0.2,
            response_mime_type: Some("application/json".to_string()),
        }
    }
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self::json(1024)
    }
}

/// A backend that turns a single prompt into text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str, options: &GenerationOptions) -> Result<String>;

    /// Short provider identifier for logs.
    fn name(&self) -> &str;

    fn model(&self) -> &str;
}

/// Turn an HTTP error status plus message into a readable provider error string.
pub(crate) fn describe_provider_error(status: u16, message: &str) -> String {
    match status {
        400 => format!("Bad request: {message}"),
        401 | 403 => format!("Authentication failed: {message}"),
        404 => format!("Model not found: {message}"),
        429 => format!("Rate limited: {message}"),
        500..=599 => format!("Provider unavailable ({status}): {message}"),
        _ => format!("Provider error ({status}): {message}"),
    }
}
