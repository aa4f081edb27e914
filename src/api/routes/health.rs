//! Health endpoint.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::api::server::AppState;

/// GET /api/health: liveness plus which backends are wired.
pub async fn get_health(State(state): State<Arc<AppState>>) -> Json<Value> {
    let memory = state.resolver.memory_stats();
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "words": state.resolver.catalog().len(),
        "generation": state.resolver.has_generator(),
        "durableCache": state.resolver.store().is_configured(),
        "tts": state.tts.is_some(),
        "memoryCache": {
            "entries": memory.total_entries,
            "hits": memory.total_hits,
        },
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::server::test_support::state_with;

    #[tokio::test]
    async fn test_get_health_returns_ok() {
        let state = Arc::new(state_with(None, None));
        let Json(body) = get_health(State(state)).await;
        assert_eq!(body["status"], "ok");
        assert!(body["version"].is_string());
        assert_eq!(body["generation"], false);
        assert_eq!(body["durableCache"], true);
        assert_eq!(body["tts"], false);
        assert!(body["words"].as_u64().unwrap() > 0);
    }
}
