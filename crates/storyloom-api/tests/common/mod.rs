//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use storyloom_core::script::Script;
use storyloom_test_support::FixedClock;
use tower::ServiceExt;

use storyloom_api::config::ServerConfig;
use storyloom_api::state::AppState;

/// Build the full app router with default configuration and a fixed clock.
pub fn build_test_app() -> Router {
    build_test_app_with(ServerConfig::default())
}

/// Build the full app router with a custom configuration.
pub fn build_test_app_with(config: ServerConfig) -> Router {
    let state = AppState::new(&config, Arc::new(FixedClock::standard()));
    storyloom_api::app(state)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if body_bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body_bytes).unwrap_or_else(|_| {
            serde_json::Value::String(String::from_utf8_lossy(&body_bytes).into_owned())
        })
    };

    (status, json)
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    app: &Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();

    send(app, request).await
}

/// Send a POST request without a body and return the response.
pub async fn post_empty(app: &Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    send(app, request).await
}

/// Send a GET request and return the response.
pub async fn get_json(app: &Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    send(app, request).await
}

/// Send a DELETE request and return the status.
pub async fn delete(app: &Router, uri: &str) -> StatusCode {
    let request = Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    send(app, request).await.0
}

/// Start a playtest of `script` and return its base URI.
pub async fn start_playtest(app: &Router, script: &Script) -> String {
    let (status, json) = post_json(
        app,
        "/api/v1/playtests",
        &serde_json::json!({ "script": script }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "start failed: {json}");

    format!("/api/v1/playtests/{}", json["id"].as_str().unwrap())
}
