use crate::{BrokerGateway, ConsumerError, DeliveryHandler, Result as ConsumerErrorResult};

use async_trait::async_trait;
use bytes::Bytes;

/// Gateway used when no broker is configured or reachable.
///
/// Reports disconnected and refuses every operation, which keeps the
/// registry permanently in degraded (direct-write) mode.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableGateway;

#[async_trait]
impl BrokerGateway for UnavailableGateway {
    fn is_connected(&self) -> bool {
        false
    }

    async fn create_queue(&self, _tenant_id: &str) -> ConsumerErrorResult<()> {
        Err(ConsumerError::broker_unavailable("create queue"))
    }

    async fn delete_queue(&self, _tenant_id: &str) -> ConsumerErrorResult<()> {
        Err(ConsumerError::broker_unavailable("delete queue"))
    }

    async fn subscribe(
        &self,
        _tenant_id: &str,
        _handler: DeliveryHandler,
    ) -> ConsumerErrorResult<String> {
        Err(ConsumerError::broker_unavailable("subscribe"))
    }

    async fn cancel(&self, _consumer_tag: &str) -> ConsumerErrorResult<()> {
        Err(ConsumerError::broker_unavailable("cancel"))
    }

    async fn publish(&self, _tenant_id: &str, _payload: Bytes) -> ConsumerErrorResult<()> {
        Err(ConsumerError::broker_unavailable("publish"))
    }
}
