//! Axum API server.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderName, HeaderValue, Method};
use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use super::routes;
use crate::catalog::WordCatalog;
use crate::config::{Config, ServerConfig};
use crate::error::Result;
use crate::resolver::DetailResolver;
use crate::study::StudySessions;
use crate::tts::{GoogleTts, SpeechSynthesizer};

/// Request bodies above this size are rejected with 413.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

pub const X_CACHE: HeaderName = HeaderName::from_static("x-cache");
pub const X_GENERATION_TIME: HeaderName = HeaderName::from_static("x-generation-time");
pub const X_STUDY_SESSION: HeaderName = HeaderName::from_static("x-study-session");
pub const X_NAVIGATION_TYPE: HeaderName = HeaderName::from_static("x-navigation-type");

/// Shared state for all API handlers.
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<DetailResolver>,
    /// `None` when `TTS_API_KEY` is not configured.
    pub tts: Option<Arc<dyn SpeechSynthesizer>>,
    pub study: Arc<StudySessions>,
}

impl AppState {
    pub fn new(
        resolver: Arc<DetailResolver>,
        tts: Option<Arc<dyn SpeechSynthesizer>>,
        study: Arc<StudySessions>,
    ) -> Self {
        Self {
            resolver,
            tts,
            study,
        }
    }

    /// Build the full state over the builtin catalog.
    pub fn from_config(config: &Config) -> Result<Self> {
        let catalog = Arc::new(WordCatalog::builtin());
        let resolver = Arc::new(DetailResolver::from_config(config, catalog.clone())?);
        let tts: Option<Arc<dyn SpeechSynthesizer>> = match GoogleTts::from_config(&config.tts)? {
            Some(tts) => Some(Arc::new(tts)),
            None => {
                warn!("TTS_API_KEY is not configured; /api/tts will return 500");
                None
            }
        };
        let study = Arc::new(
            StudySessions::in_memory(catalog, Duration::from_secs(config.study.countdown_secs))
                .with_limits(
                    Duration::from_secs(config.study.session_idle_secs),
                    config.study.max_sessions,
                ),
        );
        Ok(Self::new(resolver, tts, study))
    }
}

fn cors_layer(origin: Option<&str>) -> CorsLayer {
    let allow_origin = match origin.map(str::parse::<HeaderValue>) {
        Some(Ok(value)) => AllowOrigin::exact(value),
        Some(Err(e)) => {
            warn!(error = %e, "Invalid CORS origin, allowing any origin");
            AllowOrigin::any()
        }
        None => AllowOrigin::any(),
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([
            HeaderName::from_static("content-type"),
            X_STUDY_SESSION,
            X_NAVIGATION_TYPE,
        ])
        .expose_headers([X_CACHE, X_GENERATION_TIME, X_STUDY_SESSION])
}

/// Build the axum router with all API routes.
pub fn build_router(state: AppState, cors_origin: Option<&str>) -> Router {
    Router::new()
        .route("/api/health", get(routes::health::get_health))
        // Words
        .route("/api/words", get(routes::words::list_words))
        .route("/api/words/{slug}", get(routes::words::get_word))
        .route(
            "/api/words/{slug}/cache",
            delete(routes::words::clear_word_cache),
        )
        // Audio
        .route("/api/tts", post(routes::tts::synthesize))
        // Study flow
        .route(
            "/api/study",
            get(routes::study::get_study).delete(routes::study::reset_study),
        )
        .route("/api/study/answer", post(routes::study::answer))
        .route("/api/study/undo", post(routes::study::undo))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors_layer(cors_origin))
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

/// Start the API server and run until Ctrl-C.
pub async fn start_server(
    config: &ServerConfig,
    state: AppState,
) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let app = build_router(state, config.cors_origin.as_deref());
    let addr = format!("{}:{}", config.bind, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("tango API listening on http://{addr}");
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down");
        })
        .await?;
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::util::ServiceExt;

    #[test]
    fn test_from_config_without_keys() {
        let state = AppState::from_config(&Config::default()).unwrap();
        assert!(state.tts.is_none());
        assert!(!state.resolver.has_generator());
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let app = build_router(state_with(None, None), None);
        let req = Request::builder().uri("/api/nope").body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_cors_exact_origin() {
        let app = build_router(state_with(None, None), Some("https://tango.example"));
        let req = Request::builder()
            .uri("/api/health")
            .header("origin", "https://tango.example")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(
            resp.headers()["access-control-allow-origin"],
            "https://tango.example"
        );
    }

    #[tokio::test]
    async fn test_oversized_body_is_rejected() {
        let app = build_router(state_with(None, None), None);
        let text = "a".repeat(MAX_BODY_BYTES + 1);
        let body = serde_json::json!({ "text": text }).to_string();
        let req = Request::builder()
            .method("POST")
            .uri("/api/tts")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
