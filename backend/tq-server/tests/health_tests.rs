//! Integration tests for health and metrics endpoints
mod common;

use crate::common::{create_degraded_app_state, create_test_app_state, send};

use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn given_connected_broker_when_health_checked_then_healthy() {
    // Given
    let (state, _broker) = create_test_app_state().await;
    send(&state, "POST", "/api/v1/tenants/t1/consumer", None).await;

    // When
    let (status, json) = send(&state, "GET", "/health", None).await;

    // Then
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["components"]["broker"], "connected");
    assert_eq!(json["components"]["database"], "operational");
    assert_eq!(json["consumers"], json!(1));
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn given_no_broker_when_health_checked_then_degraded_but_ok() {
    let state = create_degraded_app_state().await;

    let (status, json) = send(&state, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["components"]["broker"], "degraded");
}

#[tokio::test]
async fn given_closed_database_when_probed_then_not_ready() {
    // Given
    let (state, _broker) = create_test_app_state().await;
    state.messages.pool().close().await;

    // When
    let (ready, _) = send(&state, "GET", "/ready", None).await;
    let (health, json) = send(&state, "GET", "/health", None).await;

    // Then
    assert_eq!(ready, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(health, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["status"], "unhealthy");
}

#[tokio::test]
async fn given_running_server_when_probed_then_live_and_ready() {
    let (state, _broker) = create_test_app_state().await;

    let (live, _) = send(&state, "GET", "/live", None).await;
    let (ready, _) = send(&state, "GET", "/ready", None).await;

    assert_eq!(live, StatusCode::OK);
    assert_eq!(ready, StatusCode::OK);
}

#[tokio::test]
async fn given_no_recorder_when_metrics_requested_then_404() {
    let (state, _broker) = create_test_app_state().await;

    let (status, _) = send(&state, "GET", "/metrics", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}
