//! Integration tests for the health endpoint.

mod common;

use axum::http::StatusCode;
use storyloom_test_support::fixtures;

#[tokio::test]
async fn test_health_returns_200_with_status_ok() {
    let app = common::build_test_app();

    let (status, json) = common::get_json(&app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
    assert_eq!(json["sessions"], 0);
}

#[tokio::test]
async fn test_health_counts_live_sessions() {
    let app = common::build_test_app();
    common::start_playtest(&app, &fixtures::linear(2)).await;

    let (_, json) = common::get_json(&app, "/health").await;

    assert_eq!(json["sessions"], 1);
}

#[tokio::test]
async fn test_unknown_route_returns_404() {
    let app = common::build_test_app();

    let (status, _) = common::get_json(&app, "/api/v1/nonexistent").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}
