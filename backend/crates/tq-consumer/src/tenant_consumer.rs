use crate::WorkerPool;

use tq_core::ConsumerStatus;

/// Prefix of placeholder tags given to consumers started without a broker.
pub const MOCK_TAG_PREFIX: &str = "mock_consumer";

/// Active consumption unit for one tenant.
#[derive(Clone)]
pub struct TenantConsumer {
    tenant_id: String,
    consumer_tag: String,
    worker_count: usize,
    active: bool,
    /// Whether `consumer_tag` names a live broker subscription
    subscribed: bool,
    pool: WorkerPool,
}

impl TenantConsumer {
    pub fn new(tenant_id: &str, consumer_tag: String, subscribed: bool, pool: WorkerPool) -> Self {
        Self {
            tenant_id: tenant_id.to_string(),
            consumer_tag,
            worker_count: pool.worker_count(),
            active: true,
            subscribed,
            pool,
        }
    }

    /// Placeholder tag for a consumer with no broker subscription.
    pub fn mock_tag(tenant_id: &str) -> String {
        format!(
            "{}_{}_{}",
            MOCK_TAG_PREFIX,
            tenant_id,
            chrono::Utc::now().timestamp_millis()
        )
    }

    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    pub fn consumer_tag(&self) -> &str {
        &self.consumer_tag
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscribed
    }

    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    /// Apply a new worker count to the pool and record it.
    pub(crate) fn set_worker_count(&mut self, worker_count: usize) -> crate::Result<()> {
        self.pool.set_worker_count(worker_count)?;
        self.worker_count = worker_count;
        Ok(())
    }

    pub(crate) fn deactivate(&mut self) {
        self.active = false;
    }

    pub fn status(&self, broker_connected: bool) -> ConsumerStatus {
        ConsumerStatus {
            tenant_id: self.tenant_id.clone(),
            consumer_tag: self.consumer_tag.clone(),
            worker_count: self.worker_count,
            active: self.active,
            broker_connected,
        }
    }
}
