use crate::{CoreResult, StoredMessage};

use async_trait::async_trait;
use serde_json::Value;

/// Durable store for messages accepted on behalf of a tenant.
///
/// Implementations may block on I/O; callers must not hold locks across
/// `persist`.
#[async_trait]
pub trait MessageSink: Send + Sync {
    async fn persist(&self, tenant_id: &str, payload: Value) -> CoreResult<StoredMessage>;
}
