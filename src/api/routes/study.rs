//! Study flow routes.
//!
//! Clients identify their session with `X-Study-Session`. A request without
//! one starts a new session; the id is returned in the same header and must
//! be sent on later requests.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use super::error_response;
use crate::api::server::{AppState, X_NAVIGATION_TYPE, X_STUDY_SESSION};
use crate::error::{Result, TangoError};
use crate::study::{Answer, AnswerOutcome, NavigationType, StudyController};

const MAX_SESSION_ID_LEN: usize = 64;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnswerRequest {
    pick_id: u64,
    answer: Answer,
}

fn session_id(headers: &HeaderMap) -> Result<String> {
    let Some(raw) = headers.get(&X_STUDY_SESSION) else {
        return Ok(uuid::Uuid::new_v4().to_string());
    };
    let id = raw
        .to_str()
        .map_err(|_| TangoError::Study("session id is not valid ASCII".into()))?
        .trim();
    let valid = !id.is_empty()
        && id.len() <= MAX_SESSION_ID_LEN
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !valid {
        return Err(TangoError::Study(format!("invalid session id '{}'", id)));
    }
    Ok(id.to_string())
}

fn navigation_type(headers: &HeaderMap) -> NavigationType {
    headers
        .get(&X_NAVIGATION_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(NavigationType::parse)
        .unwrap_or_default()
}

/// Snapshot of a session as returned by every study route.
fn view(controller: &StudyController) -> Value {
    let now = Utc::now();
    let current = match (controller.state().current.as_ref(), controller.current_word()) {
        (Some(pick), Some(word)) => json!({
            "pickId": pick.id,
            "slug": word.slug,
            "term": word.term,
            "answered": pick.answered,
            "startedAt": pick.started_at.to_rfc3339(),
        }),
        _ => Value::Null,
    };
    let countdown = controller.countdown().map_or(Value::Null, |c| {
        json!({
            "totalMs": c.duration.as_millis() as u64,
            "remainingMs": c.remaining(now).as_millis() as u64,
            "progress": c.progress(now),
            "expired": c.is_expired(now),
        })
    });
    json!({
        "current": current,
        "countdown": countdown,
        "stats": controller.stats(),
        "canUndo": !controller.state().history.is_empty(),
    })
}

fn respond(session: &str, mut body: Value) -> Response {
    body["sessionId"] = json!(session);
    let mut response = Json(body).into_response();
    if let Ok(value) = HeaderValue::from_str(session) {
        response.headers_mut().insert(X_STUDY_SESSION, value);
    }
    response
}

fn bad_session(e: TangoError) -> Response {
    error_response(StatusCode::BAD_REQUEST, e.to_string()).into_response()
}

/// GET /api/study: restore or start the session's current card.
pub async fn get_study(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let session = match session_id(&headers) {
        Ok(id) => id,
        Err(e) => return bad_session(e),
    };
    let nav = navigation_type(&headers);
    let body = state.study.with_session(&session, |c| {
        c.restore(nav);
        view(c)
    });
    respond(&session, body)
}

/// POST /api/study/answer with `{"pickId": n, "answer": "known" | "unknown"}`.
pub async fn answer(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let session = match session_id(&headers) {
        Ok(id) => id,
        Err(e) => return bad_session(e),
    };
    let Ok(req) = serde_json::from_slice::<AnswerRequest>(&body) else {
        return error_response(StatusCode::BAD_REQUEST, "Invalid request body").into_response();
    };

    let body = state.study.with_session(&session, |c| {
        let outcome = c.answer(req.pick_id, req.answer);
        let mut body = view(c);
        let (kind, open) = match outcome {
            AnswerOutcome::Next => ("next", Value::Null),
            AnswerOutcome::OpenDetail(slug) => ("openDetail", json!(slug)),
            AnswerOutcome::Ignored => ("ignored", Value::Null),
        };
        body["outcome"] = json!(kind);
        body["openSlug"] = open;
        body
    });
    respond(&session, body)
}

/// POST /api/study/undo
pub async fn undo(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let session = match session_id(&headers) {
        Ok(id) => id,
        Err(e) => return bad_session(e),
    };
    let body = state.study.with_session(&session, |c| {
        let undone = c.undo();
        let mut body = view(c);
        body["undone"] = json!(undone);
        body
    });
    respond(&session, body)
}

/// DELETE /api/study
pub async fn reset_study(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let session = match session_id(&headers) {
        Ok(id) => id,
        Err(e) => return bad_session(e),
    };
    state.study.remove(&session);
    respond(&session, json!({ "reset": true }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::build_router;
    use crate::api::server::test_support::{json_body, state_with};
    use axum::body::Body;
    use axum::http::Request;
    use axum::Router;
    use tower::util::ServiceExt;

    fn app() -> Router {
        build_router(state_with(None, None), None)
    }

    fn request(method: &str, uri: &str, session: Option<&str>, body: Option<Value>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(s) = session {
            builder = builder.header("x-study-session", s);
        }
        match body {
            Some(b) => builder
                .header("content-type", "application/json")
                .body(Body::from(b.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, HeaderMap, Value) {
        let resp = app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let headers = resp.headers().clone();
        (status, headers, json_body(resp).await)
    }

    #[test]
    fn test_session_id_validation() {
        let mut headers = HeaderMap::new();
        assert_eq!(session_id(&headers).unwrap().len(), 36);

        headers.insert(X_STUDY_SESSION, HeaderValue::from_static("abc-123"));
        assert_eq!(session_id(&headers).unwrap(), "abc-123");

        headers.insert(X_STUDY_SESSION, HeaderValue::from_static("../etc"));
        assert!(matches!(session_id(&headers), Err(TangoError::Study(_))));
    }

    #[tokio::test]
    async fn test_new_session_is_issued() {
        let (status, headers, body) = send(&app(), request("GET", "/api/study", None, None)).await;
        assert_eq!(status, StatusCode::OK);
        let id = headers["x-study-session"].to_str().unwrap();
        assert_eq!(body["sessionId"], id);
        assert!(body["current"]["slug"].is_string());
        assert_eq!(body["countdown"]["totalMs"], 5000);
        assert_eq!(body["canUndo"], false);
    }

    #[tokio::test]
    async fn test_reload_keeps_card() {
        let app = app();
        let (_, _, first) = send(&app, request("GET", "/api/study", Some("s1"), None)).await;

        let mut req = request("GET", "/api/study", Some("s1"), None);
        req.headers_mut()
            .insert(X_NAVIGATION_TYPE, HeaderValue::from_static("reload"));
        let (_, _, second) = send(&app, req).await;
        assert_eq!(second["current"]["pickId"], first["current"]["pickId"]);
        assert_eq!(second["current"]["slug"], first["current"]["slug"]);
    }

    #[tokio::test]
    async fn test_answer_flow_with_undo() {
        let app = app();
        let (_, _, start) = send(&app, request("GET", "/api/study", Some("s2"), None)).await;
        let pick_id = start["current"]["pickId"].clone();
        let slug = start["current"]["slug"].clone();

        let answer = json!({ "pickId": pick_id, "answer": "unknown" });
        let (status, _, body) = send(
            &app,
            request("POST", "/api/study/answer", Some("s2"), Some(answer.clone())),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["outcome"], "openDetail");
        assert_eq!(body["openSlug"], slug);
        assert_eq!(body["stats"]["unknown"], 1);

        // Double submit is ignored.
        let (_, _, body) = send(
            &app,
            request("POST", "/api/study/answer", Some("s2"), Some(answer)),
        )
        .await;
        assert_eq!(body["outcome"], "ignored");
        assert_eq!(body["stats"]["answered"], 1);

        let (_, _, body) = send(&app, request("POST", "/api/study/undo", Some("s2"), None)).await;
        assert_eq!(body["undone"], true);
        assert_eq!(body["current"]["slug"], slug);
        assert_eq!(body["stats"]["answered"], 0);
    }

    #[tokio::test]
    async fn test_known_answer_moves_on() {
        let app = app();
        let (_, _, start) = send(&app, request("GET", "/api/study", Some("s3"), None)).await;
        let answer = json!({ "pickId": start["current"]["pickId"], "answer": "known" });
        let (_, _, body) = send(
            &app,
            request("POST", "/api/study/answer", Some("s3"), Some(answer)),
        )
        .await;
        assert_eq!(body["outcome"], "next");
        assert!(body["openSlug"].is_null());
        assert_ne!(body["current"]["pickId"], start["current"]["pickId"]);
        assert_ne!(body["current"]["slug"], start["current"]["slug"]);
    }

    #[tokio::test]
    async fn test_invalid_answer_body() {
        let (status, _, body) = send(
            &app(),
            request(
                "POST",
                "/api/study/answer",
                Some("s4"),
                Some(json!({ "pickId": 0, "answer": "maybe" })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid request body");
    }

    #[tokio::test]
    async fn test_invalid_session_header() {
        let (status, _, body) =
            send(&app(), request("GET", "/api/study", Some("bad id!"), None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().starts_with("Study session error"));
    }

    #[tokio::test]
    async fn test_reset() {
        let app = app();
        let (_, _, start) = send(&app, request("GET", "/api/study", Some("s5"), None)).await;
        let answer = json!({ "pickId": start["current"]["pickId"], "answer": "known" });
        send(&app, request("POST", "/api/study/answer", Some("s5"), Some(answer))).await;

        let (status, _, body) = send(&app, request("DELETE", "/api/study", Some("s5"), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["reset"], true);

        let mut req = request("GET", "/api/study", Some("s5"), None);
        req.headers_mut()
            .insert(X_NAVIGATION_TYPE, HeaderValue::from_static("reload"));
        let (_, _, body) = send(&app, req).await;
        assert_eq!(body["stats"]["answered"], 0);
        assert_eq!(body["current"]["pickId"], 0);
    }
}
