use std::sync::Arc;

use bytes::Bytes;

/// What the broker should do with a delivery once the handler has seen it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Ack,
    Nack { requeue: bool },
}

/// Per-message callback registered with `BrokerGateway::subscribe`.
///
/// Invoked once per delivery; must not block.
pub type DeliveryHandler = Arc<dyn Fn(Bytes) -> DeliveryOutcome + Send + Sync>;
