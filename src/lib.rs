//! tango: a vocabulary study server.
//!
//! Serves a fixed catalog of TOEIC-style English words. Each word's detail
//! page (Japanese meanings, examples, synonyms, usage notes) is generated by
//! Gemini on first request and cached in two tiers. Pronunciation audio is
//! proxied from Google Cloud TTS, and a flashcard study flow runs on top of
//! the catalog.

pub mod api;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod details;
pub mod error;
pub mod providers;
pub mod resolver;
pub mod study;
pub mod tts;

pub use catalog::{Word, WordCatalog};
pub use config::Config;
pub use details::WordDetails;
pub use error::{Result, TangoError};
pub use resolver::{CacheStatus, DetailResolver, Resolved};
