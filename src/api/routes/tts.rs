//! Pronunciation audio route.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::CACHE_CONTROL;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use super::error_response;
use crate::api::server::AppState;

#[derive(Debug, Deserialize)]
struct TtsRequest {
    #[serde(default)]
    text: String,
}

/// POST /api/tts with `{"text": "..."}`; answers `{"audioContent": "<base64 mp3>"}`.
pub async fn synthesize(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let Some(tts) = state.tts.as_ref() else {
        return error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "TTS_API_KEY is not configured",
        )
        .into_response();
    };

    let text = match serde_json::from_slice::<TtsRequest>(&body) {
        Ok(req) if !req.text.trim().is_empty() => req.text,
        _ => {
            return error_response(StatusCode::BAD_REQUEST, "Invalid request body").into_response()
        }
    };

    match tts.synthesize(text.trim()).await {
        Ok(audio) => (
            [(CACHE_CONTROL, "public, max-age=86400")],
            Json(json!({ "audioContent": audio })),
        )
            .into_response(),
        Err(e) => {
            warn!(error = %e, "Speech synthesis failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}
