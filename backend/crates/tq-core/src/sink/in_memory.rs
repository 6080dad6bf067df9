use crate::{CoreError, CoreResult, MessageSink, StoredMessage};

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde_json::Value;

/// Process-local message sink keyed by tenant.
///
/// Cloning shares the underlying storage. Tenants can be marked as failing
/// to exercise the per-message error path.
#[derive(Clone, Default)]
pub struct InMemorySink {
    inner: Arc<Mutex<SinkInner>>,
}

#[derive(Default)]
struct SinkInner {
    messages: HashMap<String, Vec<StoredMessage>>,
    failing: HashSet<String>,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, SinkInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Messages stored for a tenant, in persistence order.
    pub fn messages(&self, tenant_id: &str) -> Vec<StoredMessage> {
        self.lock()
            .messages
            .get(tenant_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Payloads stored for a tenant, in persistence order.
    pub fn payloads(&self, tenant_id: &str) -> Vec<Value> {
        self.messages(tenant_id)
            .into_iter()
            .map(|m| m.payload)
            .collect()
    }

    pub fn count(&self, tenant_id: &str) -> usize {
        self.lock().messages.get(tenant_id).map(Vec::len).unwrap_or(0)
    }

    /// Make every subsequent persist for `tenant_id` fail (or succeed again).
    pub fn set_failing(&self, tenant_id: &str, failing: bool) {
        let mut inner = self.lock();
        if failing {
            inner.failing.insert(tenant_id.to_string());
        } else {
            inner.failing.remove(tenant_id);
        }
    }
}

#[async_trait]
impl MessageSink for InMemorySink {
    async fn persist(&self, tenant_id: &str, payload: Value) -> CoreResult<StoredMessage> {
        let mut inner = self.lock();

        if inner.failing.contains(tenant_id) {
            return Err(CoreError::sink(tenant_id, "sink rejected write"));
        }

        let message = StoredMessage::new(tenant_id, payload);
        inner
            .messages
            .entry(tenant_id.to_string())
            .or_default()
            .push(message.clone());

        Ok(message)
    }
}
