use crate::{DeliveryHandler, Result as ConsumerErrorResult};

use async_trait::async_trait;
use bytes::Bytes;

/// Capability over the message broker.
///
/// When `is_connected()` is false every operation may fail with
/// `ConsumerError::BrokerUnavailable`; callers treat that as degraded mode,
/// never as fatal.
#[async_trait]
pub trait BrokerGateway: Send + Sync {
    fn is_connected(&self) -> bool;

    /// Declare the tenant's queue. Declaring an existing queue is a no-op.
    async fn create_queue(&self, tenant_id: &str) -> ConsumerErrorResult<()>;

    async fn delete_queue(&self, tenant_id: &str) -> ConsumerErrorResult<()>;

    /// Start consuming the tenant's queue, returning the consumer tag.
    async fn subscribe(
        &self,
        tenant_id: &str,
        handler: DeliveryHandler,
    ) -> ConsumerErrorResult<String>;

    async fn cancel(&self, consumer_tag: &str) -> ConsumerErrorResult<()>;

    async fn publish(&self, tenant_id: &str, payload: Bytes) -> ConsumerErrorResult<()>;
}
