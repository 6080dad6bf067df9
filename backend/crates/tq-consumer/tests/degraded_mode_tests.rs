mod common;

use common::{connected_manager, degraded_manager};

use tq_consumer::PublishRoute;

use googletest::prelude::*;
use serde_json::json;

#[tokio::test]
async fn given_no_broker_when_consumer_started_then_placeholder_tag_and_disconnected_status() {
    let harness = degraded_manager();

    let status = harness.manager.start_consumer("t1", 3).await.unwrap();

    assert!(status.consumer_tag.starts_with("mock_consumer_t1_"));
    assert!(!status.broker_connected);
    assert!(status.active);
    assert_that!(status.worker_count, eq(3));
}

#[tokio::test]
async fn given_no_broker_and_consumer_when_published_then_queued_in_pool_and_persisted() {
    // Given
    let harness = degraded_manager();
    harness.manager.start_consumer("t1", 2).await.unwrap();

    // When
    let route = harness.manager.publish("t1", json!({"k": "v"})).await.unwrap();
    harness.settle("t1").await;

    // Then
    assert_that!(route, eq(PublishRoute::WorkerPool));
    assert_eq!(harness.sink.payloads("t1"), vec![json!({"k": "v"})]);
}

#[tokio::test]
async fn given_no_broker_and_no_consumer_when_published_then_written_directly() {
    let harness = degraded_manager();

    let route = harness.manager.publish("lonely", json!(42)).await.unwrap();

    assert_that!(route, eq(PublishRoute::Direct));
    assert_eq!(harness.sink.payloads("lonely"), vec![json!(42)]);
}

#[tokio::test]
async fn given_failing_sink_and_no_consumer_when_published_then_sink_error_returned() {
    let harness = degraded_manager();
    harness.sink.set_failing("lonely", true);

    let result = harness.manager.publish("lonely", json!(1)).await;

    assert!(result.is_err());
    assert_that!(result.unwrap_err().error_code(), eq("SINK_ERROR"));
}

#[tokio::test]
async fn given_disconnected_broker_when_consumer_started_then_degraded_without_queue() {
    // Given
    let harness = connected_manager();
    harness.broker().set_connected(false);

    // When
    let status = harness.manager.start_consumer("t1", 1).await.unwrap();

    // Then
    assert!(status.consumer_tag.starts_with("mock_consumer_"));
    assert!(!harness.broker().queue_exists("t1"));
}

#[tokio::test]
async fn given_broker_drops_after_start_when_published_then_falls_back_to_pool() {
    // Given
    let harness = connected_manager();
    harness.manager.start_consumer("t1", 1).await.unwrap();
    harness.broker().set_connected(false);

    // When
    let route = harness.manager.publish("t1", json!("offline")).await.unwrap();
    harness.settle("t1").await;

    // Then
    assert_that!(route, eq(PublishRoute::WorkerPool));
    assert_eq!(harness.sink.payloads("t1"), vec![json!("offline")]);
    let status = harness.manager.get_status("t1").await.unwrap();
    assert!(!status.broker_connected);
}

#[tokio::test]
async fn given_broker_drops_after_start_when_stopped_then_entry_removed_and_queue_left() {
    // Given
    let harness = connected_manager();
    harness.manager.start_consumer("t1", 1).await.unwrap();
    harness.broker().set_connected(false);

    // When
    let stopped = harness.manager.stop_consumer("t1").await;

    // Then
    assert!(stopped);
    assert_that!(harness.manager.get_status("t1").await, none());
    assert!(harness.broker().queue_exists("t1"));
}
