pub mod broker;
pub mod error;
pub mod metrics;
pub mod queue_policy;
pub mod tenant_consumer;
pub mod tenant_manager;
pub mod worker_pool;

pub use broker::delivery::{DeliveryHandler, DeliveryOutcome};
pub use broker::gateway::BrokerGateway;
pub use broker::in_memory::{BrokerOperation, InMemoryBroker, REDELIVERY_DELAY};
pub use broker::unavailable::UnavailableGateway;
pub use error::{ConsumerError, Result};
pub use metrics::Metrics;
pub use queue_policy::QueuePolicy;
pub use tenant_consumer::TenantConsumer;
pub use tenant_manager::{ManagerSettings, PublishRoute, ShutdownReport, TenantManager};
pub use worker_pool::WorkerPool;

#[cfg(test)]
mod tests;

use tracing::info_span;

/// Create a tracing span for one drain loop of a tenant's worker pool.
/// All log entries emitted while draining will include these fields.
pub fn create_drain_span(tenant_id: &str, worker_slot: usize) -> tracing::Span {
    info_span!(
        "worker_pool_drain",
        tenant_id = %tenant_id,
        worker_slot = worker_slot,
    )
}
