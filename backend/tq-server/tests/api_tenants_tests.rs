//! Integration tests for tenant status and deprovisioning
mod common;

use crate::common::{create_degraded_app_state, create_test_app_state, send, settle};

use axum::http::StatusCode;
use googletest::prelude::*;
use serde_json::json;

#[tokio::test]
async fn given_unknown_tenant_when_status_requested_then_inactive_with_no_messages() {
    let (state, _broker) = create_test_app_state().await;

    let (status, json) = send(&state, "GET", "/api/v1/tenants/nobody", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["tenantId"], "nobody");
    assert_eq!(json["consumerActive"], false);
    assert_eq!(json["messageCount"], 0);
}

#[tokio::test]
async fn given_consumer_and_messages_when_status_requested_then_both_reported() {
    // Given
    let (state, _broker) = create_test_app_state().await;
    send(&state, "POST", "/api/v1/tenants/t1/consumer", None).await;
    for n in 0..3 {
        send(&state, "POST", "/api/v1/tenants/t1/messages", Some(json!({ "n": n }))).await;
    }
    settle(&state, "t1").await;

    // When
    let (status, json) = send(&state, "GET", "/api/v1/tenants/t1", None).await;

    // Then
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["consumerActive"], true);
    assert_eq!(json["messageCount"], 3);
}

#[tokio::test]
async fn given_running_tenant_when_deprovisioned_then_consumer_stopped_and_messages_purged() {
    // Given
    let (state, broker) = create_test_app_state().await;
    send(&state, "POST", "/api/v1/tenants/t1/consumer", None).await;
    send(&state, "POST", "/api/v1/tenants/t2/messages", Some(json!("keep"))).await;
    for n in 0..4 {
        send(&state, "POST", "/api/v1/tenants/t1/messages", Some(json!(n))).await;
    }
    settle(&state, "t1").await;

    // When
    let (status, json) = send(&state, "DELETE", "/api/v1/tenants/t1", None).await;

    // Then
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["tenantId"], "t1");
    assert_eq!(json["consumerStopped"], true);
    assert_eq!(json["messagesDeleted"], 4);
    assert_that!(state.manager.get_status("t1").await, none());
    assert!(!broker.queue_exists("t1"));
    assert_that!(state.messages.count_by_tenant("t1").await, ok(eq(&0)));
    assert_that!(state.messages.count_by_tenant("t2").await, ok(eq(&1)));
}

#[tokio::test]
async fn given_queued_work_when_deprovisioned_then_nothing_left_behind() {
    // Given
    let state = create_degraded_app_state().await;
    send(&state, "POST", "/api/v1/tenants/t1/consumer", None).await;
    for n in 0..10 {
        send(&state, "POST", "/api/v1/tenants/t1/messages", Some(json!(n))).await;
    }

    // When
    let (status, json) = send(&state, "DELETE", "/api/v1/tenants/t1", None).await;

    // Then
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["messagesDeleted"], 10);
    assert_that!(state.messages.count_by_tenant("t1").await, ok(eq(&0)));
}

#[tokio::test]
async fn given_tenant_without_consumer_when_deprovisioned_then_messages_still_purged() {
    let (state, _broker) = create_test_app_state().await;
    send(&state, "POST", "/api/v1/tenants/t1/messages", Some(json!(1))).await;

    let (status, json) = send(&state, "DELETE", "/api/v1/tenants/t1", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["consumerStopped"], false);
    assert_eq!(json["messagesDeleted"], 1);
}

#[tokio::test]
async fn given_invalid_tenant_id_when_deprovisioned_then_400() {
    let (state, _broker) = create_test_app_state().await;

    let (status, json) = send(&state, "DELETE", "/api/v1/tenants/bad.tenant", None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["field"], "tenantId");
}
