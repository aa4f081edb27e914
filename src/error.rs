//! Error types for tango.

use thiserror::Error;

/// Errors produced by the library side of tango.
#[derive(Debug, Error)]
pub enum TangoError {
    /// Missing or invalid configuration (API keys, cache endpoint, ...).
    #[error("{0}")]
    Config(String),

    /// The text generation backend failed or returned an error status.
    #[error("{0}")]
    Provider(String),

    /// The generated text could not be turned into word details.
    #[error("{0}")]
    Generation(String),

    /// The key-value cache backend failed.
    #[error("Cache error: {0}")]
    Cache(String),

    /// Speech synthesis failed.
    #[error("{0}")]
    Speech(String),

    /// Study session bookkeeping failed.
    #[error("Study session error: {0}")]
    Study(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TangoError>;
