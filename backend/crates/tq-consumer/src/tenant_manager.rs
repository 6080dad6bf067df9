use crate::{
    BrokerGateway, ConsumerError, DeliveryHandler, DeliveryOutcome, Metrics, QueuePolicy,
    Result as ConsumerErrorResult, TenantConsumer, WorkerPool,
};

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use bytes::Bytes;
use futures::future::join_all;
use log::{debug, error, info, warn};
use serde_json::Value;
use tokio::sync::{RwLock, watch};
use tq_core::{ConsumerStatus, MessageSink};

pub const DEFAULT_MAX_WORKERS: usize = 64;
pub const DEFAULT_DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

/// Tunables applied to every consumer the manager starts.
#[derive(Debug, Clone)]
pub struct ManagerSettings {
    pub queue_policy: QueuePolicy,
    pub max_workers: usize,
    /// How long `shutdown` waits for stopped pools to go idle
    pub drain_timeout: Duration,
}

impl Default for ManagerSettings {
    fn default() -> Self {
        Self {
            queue_policy: QueuePolicy::default(),
            max_workers: DEFAULT_MAX_WORKERS,
            drain_timeout: DEFAULT_DRAIN_TIMEOUT,
        }
    }
}

/// Where a published message went.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishRoute {
    /// Published to the tenant's broker queue
    Broker,
    /// Queued straight into the tenant's worker pool
    WorkerPool,
    /// Persisted through the sink with no consumer involved
    Direct,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShutdownReport {
    pub stopped: usize,
    pub drained: usize,
    /// Tenants whose pools still had work when the drain timeout expired
    pub timed_out: Vec<String>,
}

/// Registry of per-tenant consumers.
///
/// Start and stop run in phases: the entry is reserved or marked under the
/// lock, broker calls happen with the lock released, then the entry is
/// committed or removed. Entries that are still starting are never visible
/// through the status accessors.
pub struct TenantManager {
    inner: Arc<RwLock<ManagerInner>>,
    gateway: Arc<dyn BrokerGateway>,
    sink: Arc<dyn MessageSink>,
    settings: ManagerSettings,
    metrics: Metrics,
    next_start: Arc<AtomicU64>,
}

struct ManagerInner {
    consumers: HashMap<String, ConsumerSlot>,
}

enum ConsumerSlot {
    /// Reserved by the start attempt with this id
    Starting(u64),
    Active(TenantConsumer),
    /// Being torn down; the receiver flips to `true` once the entry is gone
    Stopping(TenantConsumer, watch::Receiver<bool>),
}

impl ConsumerSlot {
    fn visible(&self) -> Option<&TenantConsumer> {
        match self {
            ConsumerSlot::Starting(_) => None,
            ConsumerSlot::Active(c) | ConsumerSlot::Stopping(c, _) => Some(c),
        }
    }
}

impl TenantManager {
    pub fn new(
        gateway: Arc<dyn BrokerGateway>,
        sink: Arc<dyn MessageSink>,
        settings: ManagerSettings,
    ) -> Self {
        Self {
            inner: Arc::new(RwLock::new(ManagerInner {
                consumers: HashMap::new(),
            })),
            gateway,
            sink,
            settings,
            metrics: Metrics::new(),
            next_start: Arc::new(AtomicU64::new(1)),
        }
    }

    pub fn settings(&self) -> &ManagerSettings {
        &self.settings
    }

    pub fn is_broker_connected(&self) -> bool {
        self.gateway.is_connected()
    }

    /// Start a consumer for `tenant_id` with `worker_count` drain loops.
    ///
    /// An unreachable broker is not an error: the consumer is registered
    /// with a placeholder tag and only receives messages through `enqueue`
    /// and `publish`.
    pub async fn start_consumer(
        &self,
        tenant_id: &str,
        worker_count: usize,
    ) -> ConsumerErrorResult<ConsumerStatus> {
        self.validate_worker_count(worker_count)?;

        let start_id = self.next_start.fetch_add(1, Ordering::SeqCst);
        {
            let mut inner = self.inner.write().await;
            if inner.consumers.contains_key(tenant_id) {
                self.metrics.duplicate_start();
                warn!("Consumer for tenant {} already exists", tenant_id);
                return Err(ConsumerError::already_exists(tenant_id));
            }
            inner
                .consumers
                .insert(tenant_id.to_string(), ConsumerSlot::Starting(start_id));
        }

        let consumer = match self.provision(tenant_id, worker_count).await {
            Ok(consumer) => consumer,
            Err(e) => {
                self.release_reservation(tenant_id, start_id).await;
                self.metrics.consumer_start_failed();
                error!("Failed to start consumer for tenant {}: {}", tenant_id, e);
                return Err(e);
            }
        };

        let committed = {
            let mut inner = self.inner.write().await;
            match inner.consumers.get(tenant_id) {
                Some(ConsumerSlot::Starting(id)) if *id == start_id => {
                    inner.consumers.insert(
                        tenant_id.to_string(),
                        ConsumerSlot::Active(consumer.clone()),
                    );
                    true
                }
                _ => false,
            }
        };

        if !committed {
            // Reservation was dropped by shutdown while we were provisioning
            self.teardown(&consumer).await;
            self.metrics.consumer_start_failed();
            warn!(
                "Consumer for tenant {} was cancelled during start",
                tenant_id
            );
            return Err(ConsumerError::start_failed(
                tenant_id,
                "registry shut down during start",
            ));
        }

        self.metrics.consumer_started(!consumer.is_subscribed());
        info!(
            "Started consumer for tenant {} with {} workers (tag {})",
            tenant_id,
            consumer.worker_count(),
            consumer.consumer_tag()
        );

        Ok(consumer.status(self.gateway.is_connected()))
    }

    /// Stop the tenant's consumer. Returns `false` when there was nothing
    /// to stop. Broker teardown is best effort and never fails the stop.
    pub async fn stop_consumer(&self, tenant_id: &str) -> bool {
        self.stop_inner(tenant_id).await.is_some()
    }

    pub async fn update_concurrency(
        &self,
        tenant_id: &str,
        worker_count: usize,
    ) -> ConsumerErrorResult<ConsumerStatus> {
        self.validate_worker_count(worker_count)?;

        let mut inner = self.inner.write().await;
        let Some(ConsumerSlot::Active(consumer)) = inner.consumers.get_mut(tenant_id) else {
            return Err(ConsumerError::not_found(tenant_id));
        };

        let previous = consumer.worker_count();
        consumer.set_worker_count(worker_count)?;
        self.metrics.concurrency_updated(worker_count);
        info!(
            "Updated concurrency for tenant {} from {} to {}",
            tenant_id, previous, worker_count
        );

        Ok(consumer.status(self.gateway.is_connected()))
    }

    /// Update concurrency if the tenant has a consumer, otherwise start one.
    pub async fn reconfigure_or_start(
        &self,
        tenant_id: &str,
        worker_count: usize,
    ) -> ConsumerErrorResult<ConsumerStatus> {
        match self.update_concurrency(tenant_id, worker_count).await {
            Err(ConsumerError::NotFound { .. }) => {
                info!(
                    "No consumer for tenant {}, starting one with {} workers",
                    tenant_id, worker_count
                );
                self.start_consumer(tenant_id, worker_count).await
            }
            other => other,
        }
    }

    /// Queue a payload directly into the tenant's worker pool.
    pub async fn enqueue(&self, tenant_id: &str, payload: Value) -> ConsumerErrorResult<()> {
        let pool = self
            .active_consumer(tenant_id)
            .await
            .map(|c| c.pool().clone())
            .ok_or_else(|| ConsumerError::not_found(tenant_id))?;

        pool.enqueue(payload)
    }

    /// Route a message for the tenant.
    ///
    /// Goes through the broker when it is connected and the tenant has a
    /// live subscription, into the pool when only a consumer exists, and
    /// straight to the sink otherwise.
    pub async fn publish(
        &self,
        tenant_id: &str,
        payload: Value,
    ) -> ConsumerErrorResult<PublishRoute> {
        let consumer = self.active_consumer(tenant_id).await;

        let subscribed = consumer.as_ref().is_some_and(|c| c.is_subscribed());
        if subscribed && self.gateway.is_connected() {
            let body = Bytes::from(serde_json::to_vec(&payload)?);
            match self.gateway.publish(tenant_id, body).await {
                Ok(()) => {
                    debug!("Published message for tenant {} to broker", tenant_id);
                    return Ok(PublishRoute::Broker);
                }
                Err(e) if e.is_degraded() => {
                    warn!(
                        "Broker unavailable while publishing for tenant {}, queueing locally",
                        tenant_id
                    );
                }
                Err(e) => return Err(e),
            }
        }

        if let Some(consumer) = consumer {
            consumer.pool().enqueue(payload)?;
            return Ok(PublishRoute::WorkerPool);
        }

        let stored = self.sink.persist(tenant_id, payload).await?;
        self.metrics.direct_write();
        debug!(
            "Persisted message {} for tenant {} directly (no consumer)",
            stored.id, tenant_id
        );
        Ok(PublishRoute::Direct)
    }

    pub async fn get_status(&self, tenant_id: &str) -> Option<ConsumerStatus> {
        let connected = self.gateway.is_connected();
        let inner = self.inner.read().await;
        inner
            .consumers
            .get(tenant_id)
            .and_then(ConsumerSlot::visible)
            .map(|c| c.status(connected))
    }

    pub async fn get_all_statuses(&self) -> Vec<ConsumerStatus> {
        let connected = self.gateway.is_connected();
        let inner = self.inner.read().await;
        inner
            .consumers
            .values()
            .filter_map(ConsumerSlot::visible)
            .map(|c| c.status(connected))
            .collect()
    }

    pub async fn active_tenants(&self) -> Vec<String> {
        let inner = self.inner.read().await;
        inner
            .consumers
            .iter()
            .filter(|(_, slot)| slot.visible().is_some())
            .map(|(tenant_id, _)| tenant_id.clone())
            .collect()
    }

    pub async fn consumer_count(&self) -> usize {
        let inner = self.inner.read().await;
        inner
            .consumers
            .values()
            .filter(|slot| slot.visible().is_some())
            .count()
    }

    /// The tenant's worker pool, if it has a registered consumer.
    pub async fn pool(&self, tenant_id: &str) -> Option<WorkerPool> {
        let inner = self.inner.read().await;
        inner
            .consumers
            .get(tenant_id)
            .and_then(ConsumerSlot::visible)
            .map(|c| c.pool().clone())
    }

    /// Stop every consumer concurrently, then wait for their pools to drain.
    ///
    /// In-flight starts are abandoned and stops already in progress are
    /// awaited. The registry is empty afterwards.
    pub async fn shutdown(&self) -> ShutdownReport {
        let (tenants, in_flight) = {
            let mut inner = self.inner.write().await;
            inner
                .consumers
                .retain(|_, slot| !matches!(slot, ConsumerSlot::Starting(_)));

            let mut tenants = Vec::new();
            let mut in_flight = Vec::new();
            for (tenant_id, slot) in &inner.consumers {
                match slot {
                    ConsumerSlot::Active(_) => tenants.push(tenant_id.clone()),
                    ConsumerSlot::Stopping(consumer, done) => {
                        in_flight.push((consumer.clone(), done.clone()))
                    }
                    ConsumerSlot::Starting(_) => {}
                }
            }
            (tenants, in_flight)
        };

        info!(
            "Shutting down {} tenant consumers ({} already stopping)",
            tenants.len(),
            in_flight.len()
        );

        let stops = join_all(tenants.iter().map(|t| self.stop_inner(t)));
        let waits = join_all(
            in_flight
                .into_iter()
                .map(|(consumer, done)| self.await_stop(consumer, done)),
        );
        let (stopped, awaited) = tokio::join!(stops, waits);

        let pools: Vec<WorkerPool> = stopped.into_iter().flatten().chain(awaited).collect();

        let timeout = self.settings.drain_timeout;
        let results = join_all(pools.iter().map(|pool| async move {
            let idle = pool.wait_idle(timeout).await;
            (pool, idle)
        }))
        .await;

        let mut report = ShutdownReport {
            stopped: pools.len(),
            ..Default::default()
        };

        for (pool, idle) in results {
            if idle {
                report.drained += 1;
            } else {
                warn!(
                    "Worker pool for tenant {} did not drain within {:?} ({} pending, {} workers active)",
                    pool.tenant_id(),
                    timeout,
                    pool.pending(),
                    pool.active_workers()
                );
                report.timed_out.push(pool.tenant_id().to_string());
            }
        }

        info!(
            "Tenant manager shut down: {} stopped, {} drained, {} timed out",
            report.stopped,
            report.drained,
            report.timed_out.len()
        );

        report
    }

    fn validate_worker_count(&self, worker_count: usize) -> ConsumerErrorResult<()> {
        if worker_count == 0 || worker_count > self.settings.max_workers {
            return Err(ConsumerError::invalid_worker_count(
                worker_count,
                self.settings.max_workers,
            ));
        }
        Ok(())
    }

    async fn active_consumer(&self, tenant_id: &str) -> Option<TenantConsumer> {
        let inner = self.inner.read().await;
        match inner.consumers.get(tenant_id) {
            Some(ConsumerSlot::Active(c)) => Some(c.clone()),
            _ => None,
        }
    }

    async fn release_reservation(&self, tenant_id: &str, start_id: u64) {
        let mut inner = self.inner.write().await;
        if matches!(inner.consumers.get(tenant_id), Some(ConsumerSlot::Starting(id)) if *id == start_id)
        {
            inner.consumers.remove(tenant_id);
        }
    }

    /// Create the queue, the pool and the subscription for a tenant.
    async fn provision(
        &self,
        tenant_id: &str,
        worker_count: usize,
    ) -> ConsumerErrorResult<TenantConsumer> {
        let mut connected = self.gateway.is_connected();

        if connected {
            match self.gateway.create_queue(tenant_id).await {
                Ok(()) => {}
                Err(e) if e.is_degraded() => {
                    warn!("Broker went away while creating queue for tenant {}", tenant_id);
                    connected = false;
                }
                Err(e) => return Err(ConsumerError::start_failed(tenant_id, e.to_string())),
            }
        }

        let pool = WorkerPool::new(
            tenant_id,
            worker_count,
            self.settings.queue_policy,
            Arc::clone(&self.sink),
            self.metrics.clone(),
        )?;

        if connected {
            let handler = delivery_handler(tenant_id, pool.clone(), self.metrics.clone());
            match self.gateway.subscribe(tenant_id, handler).await {
                Ok(tag) => return Ok(TenantConsumer::new(tenant_id, tag, true, pool)),
                Err(e) if e.is_degraded() => {
                    warn!("Broker went away while subscribing for tenant {}", tenant_id);
                }
                Err(e) => return Err(ConsumerError::start_failed(tenant_id, e.to_string())),
            }
        }

        warn!(
            "Broker not connected, starting consumer for tenant {} in degraded mode",
            tenant_id
        );
        Ok(TenantConsumer::new(
            tenant_id,
            TenantConsumer::mock_tag(tenant_id),
            false,
            pool,
        ))
    }

    /// Wait for a stop started elsewhere to finish.
    ///
    /// If that stop was dropped before removing its entry, the entry is
    /// removed here instead.
    async fn await_stop(
        &self,
        consumer: TenantConsumer,
        mut done: watch::Receiver<bool>,
    ) -> WorkerPool {
        if done.wait_for(|removed| *removed).await.is_err() {
            let tenant_id = consumer.tenant_id();
            warn!(
                "Stop for tenant {} was abandoned, removing its consumer",
                tenant_id
            );
            let mut inner = self.inner.write().await;
            if matches!(inner.consumers.get(tenant_id), Some(ConsumerSlot::Stopping(..))) {
                inner.consumers.remove(tenant_id);
                self.metrics.consumer_stopped();
            }
        }
        consumer.pool().clone()
    }

    async fn stop_inner(&self, tenant_id: &str) -> Option<WorkerPool> {
        let (mut consumer, done_tx) = {
            let mut inner = self.inner.write().await;
            let consumer = match inner.consumers.get(tenant_id) {
                Some(ConsumerSlot::Active(c)) => c.clone(),
                // Sender gone without the entry being removed
                Some(ConsumerSlot::Stopping(c, done)) if done.has_changed().is_err() => {
                    warn!("Taking over abandoned stop for tenant {}", tenant_id);
                    c.clone()
                }
                Some(_) => {
                    debug!(
                        "Consumer for tenant {} is starting or stopping, not stopping",
                        tenant_id
                    );
                    return None;
                }
                None => {
                    info!("No consumer for tenant {}, nothing to stop", tenant_id);
                    return None;
                }
            };
            let (done_tx, done_rx) = watch::channel(false);
            inner.consumers.insert(
                tenant_id.to_string(),
                ConsumerSlot::Stopping(consumer.clone(), done_rx),
            );
            (consumer, done_tx)
        };

        self.teardown(&consumer).await;

        self.inner.write().await.consumers.remove(tenant_id);
        done_tx.send_replace(true);
        consumer.deactivate();
        self.metrics.consumer_stopped();
        info!(
            "Stopped consumer for tenant {} ({} messages pending)",
            tenant_id,
            consumer.pool().pending()
        );

        Some(consumer.pool().clone())
    }

    /// Cancel the subscription and delete the queue, logging failures.
    async fn teardown(&self, consumer: &TenantConsumer) {
        if !self.gateway.is_connected() {
            debug!(
                "Broker not connected, skipping teardown for tenant {}",
                consumer.tenant_id()
            );
            return;
        }

        if consumer.is_subscribed() {
            if let Err(e) = self.gateway.cancel(consumer.consumer_tag()).await {
                warn!(
                    "Failed to cancel consumer {} for tenant {}: {}",
                    consumer.consumer_tag(),
                    consumer.tenant_id(),
                    e
                );
            }
        }

        if let Err(e) = self.gateway.delete_queue(consumer.tenant_id()).await {
            warn!(
                "Failed to delete queue for tenant {}: {}",
                consumer.tenant_id(),
                e
            );
        }
    }
}

impl Clone for TenantManager {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            gateway: Arc::clone(&self.gateway),
            sink: Arc::clone(&self.sink),
            settings: self.settings.clone(),
            metrics: self.metrics.clone(),
            next_start: Arc::clone(&self.next_start),
        }
    }
}

/// Bridge broker deliveries into a tenant's pool.
///
/// Malformed JSON is rejected for good; a full pool asks the broker to
/// requeue.
fn delivery_handler(tenant_id: &str, pool: WorkerPool, metrics: Metrics) -> DeliveryHandler {
    let tenant_id = tenant_id.to_string();

    Arc::new(move |body: Bytes| {
        let payload = match serde_json::from_slice::<Value>(&body) {
            Ok(payload) => payload,
            Err(e) => {
                error!("Invalid JSON delivered for tenant {}: {}", tenant_id, e);
                metrics.delivery_nacked("invalid_payload");
                return DeliveryOutcome::Nack { requeue: false };
            }
        };

        match pool.enqueue(payload) {
            Ok(()) => {
                metrics.delivery_acked();
                DeliveryOutcome::Ack
            }
            Err(e) => {
                warn!("Requeueing delivery for tenant {}: {}", tenant_id, e);
                metrics.delivery_nacked("queue_full");
                DeliveryOutcome::Nack { requeue: true }
            }
        }
    })
}
