//! Word list and word detail routes.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::header::CACHE_CONTROL;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use super::error_response;
use crate::api::server::{AppState, X_CACHE, X_GENERATION_TIME};
use crate::catalog::{WordPage, DEFAULT_PAGE_SIZE};

/// Largest page a client may ask for.
pub const MAX_PAGE_SIZE: usize = 100;

/// Detail responses are immutable for a day at shared caches.
pub const DETAIL_CACHE_CONTROL: &str =
    "public, max-age=0, s-maxage=86400, stale-while-revalidate=604800";

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub q: String,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

/// GET /api/words
pub async fn list_words(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Json<WordPage> {
    let page_size = query
        .page_size
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);
    Json(
        state
            .resolver
            .catalog()
            .search(&query.q, query.page.unwrap_or(1), page_size),
    )
}

/// GET /api/words/{slug}
pub async fn get_word(State(state): State<Arc<AppState>>, Path(slug): Path<String>) -> Response {
    match state.resolver.resolve(&slug).await {
        Ok(Some(resolved)) => {
            let mut response = Json(resolved.details).into_response();
            let headers = response.headers_mut();
            headers.insert(CACHE_CONTROL, HeaderValue::from_static(DETAIL_CACHE_CONTROL));
            headers.insert(X_CACHE, HeaderValue::from_static(resolved.status.as_str()));
            if let Some(elapsed) = resolved.generation_time {
                headers.insert(
                    X_GENERATION_TIME,
                    HeaderValue::from(elapsed.as_millis() as u64),
                );
            }
            response
        }
        Ok(None) => error_response(StatusCode::NOT_FOUND, "Word not found").into_response(),
        Err(e) => {
            let mut message = e.to_string();
            if message.is_empty() {
                message = "Failed to fetch word details from Gemini".to_string();
            }
            error_response(StatusCode::INTERNAL_SERVER_ERROR, message).into_response()
        }
    }
}

/// DELETE /api/words/{slug}/cache
pub async fn clear_word_cache(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Response {
    match state.resolver.invalidate(&slug).await {
        Ok(true) => Json(json!({ "slug": slug, "cleared": true })).into_response(),
        Ok(false) => error_response(StatusCode::NOT_FOUND, "Word not found").into_response(),
        Err(e) => {
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}
