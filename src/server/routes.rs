//! HTTP handlers
//!
//! - `POST /` ingests a reading: `{"id": "B", "value": 42}` (`ppm` is accepted for `value`)
//! - `GET /data` streams messages as Server-Sent Events, with keep-alive comments
//! - `GET /health` liveness probe

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tokio_stream::StreamExt;
use tower_http::cors::CorsLayer;

use crate::registry::Reading;
use crate::relay::StationRelay;

use super::config::ServerConfig;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<StationRelay>,
    pub keep_alive: Duration,
}

/// Body of `POST /`
#[derive(Debug, Clone, Deserialize)]
pub struct IngestRequest {
    /// Topic identifier
    pub id: String,
    /// Measured value (`value` or `ppm`)
    #[serde(flatten)]
    pub reading: Reading,
}

/// Success body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestAccepted {
    pub message: String,
}

/// Failure body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestRejected {
    pub error: String,
}

/// Build the relay router
pub fn create_router(relay: Arc<StationRelay>, config: &ServerConfig) -> Router {
    let state = AppState {
        relay,
        keep_alive: config.keep_alive,
    };

    let router = Router::new()
        .route("/", post(ingest))
        .route("/data", get(stream))
        .route("/health", get(health_check))
        .with_state(state);

    if config.cors_permissive {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}

async fn ingest(State(state): State<AppState>, Json(body): Json<IngestRequest>) -> Response {
    match state.relay.ingest(&body.id, body.reading).await {
        Ok(_) => (
            StatusCode::OK,
            Json(IngestAccepted {
                message: "Reading accepted".to_string(),
            }),
        )
            .into_response(),
        Err(e) => (
            StatusCode::BAD_REQUEST,
            Json(IngestRejected {
                error: e.to_string(),
            }),
        )
            .into_response(),
    }
}

async fn stream(State(state): State<AppState>) -> Response {
    let subscription = match state.relay.subscribe().await {
        Ok(subscription) => subscription,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to open event stream");
            return StatusCode::SERVICE_UNAVAILABLE.into_response();
        }
    };

    let id = subscription.id();
    let events = subscription.filter_map(move |message| {
        match message.to_json() {
            Ok(json) => Some(Ok::<_, Infallible>(Event::default().data(json))),
            Err(e) => {
                tracing::warn!(subscriber = %id, error = %e, "Failed to encode message");
                None
            }
        }
    });

    Sse::new(events)
        .keep_alive(KeepAlive::new().interval(state.keep_alive))
        .into_response()
}

/// Basic health check (always returns OK if server is running)
pub async fn health_check() -> impl IntoResponse {
    "OK"
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{header, Request};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use super::*;

    fn post_json(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let relay = Arc::new(StationRelay::new());
        let app = create_router(relay, &ServerConfig::default());

        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_post_without_subscribers() {
        let relay = Arc::new(StationRelay::new());
        let app = create_router(relay.clone(), &ServerConfig::default());

        let response = app.oneshot(post_json(r#"{"id":"A","value":1}"#)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().contains("No subscribers"));
    }

    #[tokio::test]
    async fn test_post_unknown_topic() {
        let relay = Arc::new(StationRelay::new());
        let _subscription = relay.subscribe().await.unwrap();
        let app = create_router(relay.clone(), &ServerConfig::default());

        let response = app.oneshot(post_json(r#"{"id":"Z","value":1}"#)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Invalid topic: Z");
    }

    #[tokio::test]
    async fn test_post_accepted_with_ppm_alias() {
        let relay = Arc::new(StationRelay::new());
        let _subscription = relay.subscribe().await.unwrap();
        let app = create_router(relay.clone(), &ServerConfig::default());

        let response = app.oneshot(post_json(r#"{"id":"B","ppm":42}"#)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["message"], "Reading accepted");
        assert_eq!(relay.registry().pending("B").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_post_malformed_body() {
        let relay = Arc::new(StationRelay::new());
        let app = create_router(relay, &ServerConfig::default());

        let response = app.oneshot(post_json(r#"{"id":"A"}"#)).await.unwrap();

        assert!(response.status().is_client_error());
    }

    #[tokio::test]
    async fn test_stream_headers_and_greeting() {
        let relay = Arc::new(StationRelay::new());
        let app = create_router(relay.clone(), &ServerConfig::default());

        let response = app
            .oneshot(Request::get("/data").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/event-stream"
        );
        assert_eq!(relay.subscriber_count(), 1);

        let mut body = response.into_body();
        let first = body.frame().await.unwrap().unwrap().into_data().unwrap();
        assert!(first.starts_with(b"data: {\"topics\":["));

        let second = body.frame().await.unwrap().unwrap().into_data().unwrap();
        assert_eq!(&second[..], b"data: \"Connection established\"\n\n");
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_stream_sends_keep_alive() {
        let relay = Arc::new(StationRelay::new());
        let config = ServerConfig::default().keep_alive(Duration::from_secs(1));
        let app = create_router(relay, &config);

        let response = app
            .oneshot(Request::get("/data").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let mut body = response.into_body();

        // Snapshot and confirmation
        body.frame().await.unwrap().unwrap();
        body.frame().await.unwrap().unwrap();

        // Nothing is dispatched, so the next frame is a comment
        let frame = body.frame().await.unwrap().unwrap().into_data().unwrap();
        assert!(frame.starts_with(b":"));
    }
}
