use crate::{CoreError, InMemorySink, MessageSink, queue_name};

use googletest::prelude::*;
use serde_json::json;

#[tokio::test]
async fn given_empty_sink_when_persist_then_message_is_stored_for_tenant() {
    // Given
    let sink = InMemorySink::new();

    // When
    let stored = sink.persist("tenant-a", json!({"n": 1})).await.unwrap();

    // Then
    assert_that!(stored.tenant_id.as_str(), eq("tenant-a"));
    assert_that!(sink.count("tenant-a"), eq(1));
    assert_that!(sink.count("tenant-b"), eq(0));
}

#[tokio::test]
async fn given_several_writes_when_reading_payloads_then_order_is_preserved() {
    // Given
    let sink = InMemorySink::new();
    for n in 0..5 {
        sink.persist("tenant-a", json!(n)).await.unwrap();
    }

    // When
    let payloads = sink.payloads("tenant-a");

    // Then
    assert_eq!(
        payloads,
        vec![json!(0), json!(1), json!(2), json!(3), json!(4)]
    );
}

#[tokio::test]
async fn given_failing_tenant_when_persist_then_sink_error_and_nothing_stored() {
    // Given
    let sink = InMemorySink::new();
    sink.set_failing("tenant-a", true);

    // When
    let result = sink.persist("tenant-a", json!({})).await;

    // Then
    assert!(matches!(result, Err(CoreError::Sink { .. })));
    assert_that!(sink.count("tenant-a"), eq(0));
}

#[tokio::test]
async fn given_failing_tenant_cleared_when_persist_then_stored() {
    // Given
    let sink = InMemorySink::new();
    sink.set_failing("tenant-a", true);
    sink.set_failing("tenant-a", false);

    // When
    let result = sink.persist("tenant-a", json!({})).await;

    // Then
    assert_that!(result, ok(anything()));
}

#[test]
fn given_tenant_id_when_queue_name_then_prefixed_and_suffixed() {
    assert_that!(queue_name("abc").as_str(), eq("tenant_abc_queue"));
}
