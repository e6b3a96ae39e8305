//! HTTP API for the ingest service.
//!
//! Endpoints:
//! - `GET /health` - Health check
//! - `GET /data` - Most recent readings (up to 100, newest-first)
//! - `GET /data/latest` - Most recent reading, or null
//! - `POST /data` - Ingest a reading (stored, then broadcast)
//! - `GET /ws` - Websocket upgrade for real-time pushes

use crate::client::ClientRegistry;
use crate::ingest;
use crate::store::{SharedStore, RETENTION_LIMIT};
use crate::ws_server::ws_handler;
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use common::{NewReading, Reading};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::error;

/// Application state shared across handlers.
pub struct AppState {
    pub store: SharedStore,
    pub registry: Arc<ClientRegistry>,
}

/// Create the HTTP router.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/data", get(list_data_handler).post(post_data_handler))
        .route("/data/latest", get(latest_data_handler))
        .route("/ws", get(ws_handler))
        .with_state(state)
        .layer(CorsLayer::permissive())
}

/// Health check response.
#[derive(Serialize)]
struct HealthResponse {
    status: String,
    message: String,
    backend: String,
    clients: usize,
}

/// API error response.
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    code: String,
}

impl ErrorResponse {
    fn new(error: impl ToString, code: impl ToString) -> Self {
        Self {
            error: error.to_string(),
            code: code.to_string(),
        }
    }
}

/// Health check handler.
/// GET /health
async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "OK".to_string(),
        message: "IoT dashboard API is running".to_string(),
        backend: state.store.backend_name().to_string(),
        clients: state.registry.client_count(),
    })
}

/// Most recent readings, newest-first.
/// GET /data
async fn list_data_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.store.list_recent(RETENTION_LIMIT).await {
        Ok(readings) => (StatusCode::OK, Json(readings)).into_response(),
        Err(e) => {
            error!("Failed to fetch readings: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Failed to fetch data", "STORAGE_ERROR")),
            )
                .into_response()
        }
    }
}

/// Most recent reading, or null when the store is empty.
/// GET /data/latest
async fn latest_data_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.store.latest().await {
        Ok(reading) => (StatusCode::OK, Json::<Option<Reading>>(reading)).into_response(),
        Err(e) => {
            error!("Failed to fetch latest reading: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(
                    "Failed to fetch latest data",
                    "STORAGE_ERROR",
                )),
            )
                .into_response()
        }
    }
}

/// Ingest a reading: store, broadcast, return the stored record.
/// POST /data
///
/// A body missing `temperature` or `humidity` is rejected by the Json
/// extractor before this handler runs.
async fn post_data_handler(
    State(state): State<Arc<AppState>>,
    Json(new): Json<NewReading>,
) -> impl IntoResponse {
    match ingest::ingest(&state.store, &state.registry, new).await {
        Ok(reading) => (StatusCode::CREATED, Json(reading)).into_response(),
        Err(e) => {
            error!("Failed to save reading: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Failed to save data", "STORAGE_ERROR")),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn make_app() -> (Router, Arc<AppState>) {
        let state = Arc::new(AppState {
            store: Arc::new(MemoryStore::new()),
            registry: Arc::new(ClientRegistry::new()),
        });
        (create_router(state.clone()), state)
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_data(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/data")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_returns_ok_with_memory_backend() {
        let (app, _) = make_app();
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "OK");
        assert_eq!(json["backend"], "memory");
        assert_eq!(json["clients"], 0);
    }

    #[tokio::test]
    async fn test_post_then_latest_round_trip() {
        let (app, _) = make_app();

        let response = app
            .clone()
            .oneshot(post_data(
                r#"{"temperature": 22.5, "humidity": 45.0, "deviceId": "sensor-001"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let created = body_json(response).await;
        assert_eq!(created["temperature"], 22.5);
        assert!(created["id"].as_str().is_some_and(|id| !id.is_empty()));
        assert!(created["timestamp"].as_str().is_some());

        let response = app
            .oneshot(Request::get("/data/latest").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let latest = body_json(response).await;
        assert_eq!(latest["temperature"], 22.5);
        assert_eq!(latest["humidity"], 45.0);
        assert_eq!(latest["deviceId"], "sensor-001");
    }

    #[tokio::test]
    async fn test_latest_is_null_on_empty_store() {
        let (app, _) = make_app();
        let response = app
            .oneshot(Request::get("/data/latest").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_json(response).await.is_null());
    }

    #[tokio::test]
    async fn test_post_missing_field_is_rejected() {
        let (app, state) = make_app();
        let response = app
            .oneshot(post_data(r#"{"temperature": 22.5}"#))
            .await
            .unwrap();

        assert!(response.status().is_client_error());
        assert!(state.store.latest().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_data_caps_at_retention_limit() {
        let (app, _) = make_app();

        for i in 0..150 {
            let body = format!(r#"{{"temperature": {}.0, "humidity": 45.0}}"#, i);
            let response = app.clone().oneshot(post_data(&body)).await.unwrap();
            assert_eq!(response.status(), StatusCode::CREATED);
        }

        let response = app
            .oneshot(Request::get("/data").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        let readings = json.as_array().unwrap();
        assert_eq!(readings.len(), RETENTION_LIMIT);
        assert_eq!(readings[0]["temperature"], 149.0);
        assert_eq!(readings[RETENTION_LIMIT - 1]["temperature"], 50.0);
    }
}
