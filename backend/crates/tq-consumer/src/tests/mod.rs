
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;
use tq_core::{CoreResult, InMemorySink, MessageSink, StoredMessage};

use crate::{DeliveryHandler, DeliveryOutcome, Metrics, QueuePolicy, WorkerPool};

/// Sink that sleeps before delegating, to keep workers busy
pub(crate) struct SlowSink {
    pub(crate) delay: Duration,
    pub(crate) inner: InMemorySink,
}

#[async_trait]
impl MessageSink for SlowSink {
    async fn persist(&self, tenant_id: &str, payload: Value) -> CoreResult<StoredMessage> {
        tokio::time::sleep(self.delay).await;
        self.inner.persist(tenant_id, payload).await
    }
}

pub(crate) fn pool_with_sink(
    tenant_id: &str,
    worker_count: usize,
    policy: QueuePolicy,
) -> (WorkerPool, InMemorySink) {
    let sink = InMemorySink::new();
    let pool = WorkerPool::new(
        tenant_id,
        worker_count,
        policy,
        Arc::new(sink.clone()),
        Metrics::new(),
    )
    .unwrap();
    (pool, sink)
}

/// Handler that records every delivery and answers with `outcome`
pub(crate) fn recording_handler(
    outcome: DeliveryOutcome,
) -> (DeliveryHandler, Arc<Mutex<Vec<Bytes>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let handler: DeliveryHandler = Arc::new(move |body: Bytes| {
        sink.lock().unwrap().push(body);
        outcome
    });
    (handler, seen)
}
