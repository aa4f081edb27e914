pub mod health;
pub mod study;
pub mod tts;
pub mod words;

use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

/// `{"error": message}` body used by every failing route.
pub(crate) fn error_response(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "error": message.into() })))
}
