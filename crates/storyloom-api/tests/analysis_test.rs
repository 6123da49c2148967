//! Integration tests for script analysis.

mod common;

use axum::http::StatusCode;
use storyloom_test_support::fixtures;

#[tokio::test]
async fn test_analysis_reports_dangling_jump() {
    // Arrange
    let app = common::build_test_app();
    let script = serde_json::to_value(fixtures::dangling_jump()).unwrap();

    // Act
    let (status, json) = common::post_json(&app, "/api/v1/analysis", &script).await;

    // Assert
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["has_errors"], true);
    let issues = json["report"]["issues"].as_array().unwrap();
    assert!(
        issues
            .iter()
            .any(|issue| issue["type"] == "dangling_jump" && issue["position"] == 1)
    );
}

#[tokio::test]
async fn test_analysis_of_clean_script_has_no_errors() {
    let app = common::build_test_app();
    let script = fixtures::two_way_choice();

    let (status, json) = common::post_json(
        &app,
        "/api/v1/analysis",
        &serde_json::to_value(&script).unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["has_errors"], false);
    assert_eq!(json["fingerprint"], script.fingerprint());
    assert_eq!(json["fingerprint"].as_str().unwrap().len(), 64);
    let labels = json["report"]["labels"].as_array().unwrap();
    assert_eq!(labels.len(), 2);
    assert!(labels.iter().all(|label| label["is_reachable"] == true));
}

#[tokio::test]
async fn test_analysis_rejects_malformed_script() {
    let app = common::build_test_app();

    let (status, _) = common::post_json(
        &app,
        "/api/v1/analysis",
        &serde_json::json!({ "title": "broken", "script": 5 }),
    )
    .await;

    assert!(status.is_client_error());
}
