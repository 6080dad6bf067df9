use crate::{ConsumerError, Metrics, QueuePolicy, Result as ConsumerErrorResult, create_drain_span};

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use log::{debug, error};
use serde_json::Value;
use tokio::runtime::Handle;
use tokio::sync::Notify;
use tracing::Instrument;
use tq_core::MessageSink;

/// Hard ceiling on drain loops per pool.
pub const MAX_POOL_WORKERS: usize = 1024;

/// Bounded-concurrency executor for one tenant.
///
/// Messages are queued FIFO and persisted through the sink by up to
/// `worker_count` drain loops running as tokio tasks. Loops exit when the
/// queue empties and are respawned by the next `enqueue`. Cloning shares
/// the pool.
#[derive(Clone)]
pub struct WorkerPool {
    inner: Arc<PoolInner>,
}

struct PoolInner {
    tenant_id: String,
    queue: Mutex<VecDeque<Value>>,
    worker_count: AtomicUsize,
    active_workers: AtomicUsize,
    policy: QueuePolicy,
    sink: Arc<dyn MessageSink>,
    metrics: Metrics,
    runtime: Handle,
    idle: Notify,
    processed: AtomicU64,
    failed: AtomicU64,
}

impl WorkerPool {
    /// Create an idle pool. Must be called from within a tokio runtime.
    pub fn new(
        tenant_id: &str,
        worker_count: usize,
        policy: QueuePolicy,
        sink: Arc<dyn MessageSink>,
        metrics: Metrics,
    ) -> ConsumerErrorResult<Self> {
        validate_worker_count(worker_count)?;

        let runtime = Handle::try_current().map_err(|e| {
            ConsumerError::internal(format!("worker pool requires a tokio runtime: {e}"))
        })?;

        Ok(Self {
            inner: Arc::new(PoolInner {
                tenant_id: tenant_id.to_string(),
                queue: Mutex::new(VecDeque::new()),
                worker_count: AtomicUsize::new(worker_count),
                active_workers: AtomicUsize::new(0),
                policy,
                sink,
                metrics,
                runtime,
                idle: Notify::new(),
                processed: AtomicU64::new(0),
                failed: AtomicU64::new(0),
            }),
        })
    }

    pub fn tenant_id(&self) -> &str {
        &self.inner.tenant_id
    }

    /// Queue a message and make sure enough drain loops are running.
    ///
    /// Never waits on the sink. Fails only when the queue policy rejects.
    pub fn enqueue(&self, payload: Value) -> ConsumerErrorResult<()> {
        let depth = {
            let mut queue = self.inner.lock_queue();
            if !self.inner.policy.admits(queue.len()) {
                self.inner.metrics.message_rejected();
                return Err(ConsumerError::queue_full(
                    &self.inner.tenant_id,
                    self.inner.policy.capacity().unwrap_or_default(),
                ));
            }
            queue.push_back(payload);
            queue.len()
        };

        self.inner.metrics.message_enqueued(depth);
        debug!(
            "Enqueued message for tenant {} ({} pending)",
            self.inner.tenant_id, depth
        );

        PoolInner::spawn_workers(&self.inner);
        Ok(())
    }

    /// Change the concurrency target. Running loops are left alone; extra
    /// loops are started if there is queued work to pick up.
    pub fn set_worker_count(&self, worker_count: usize) -> ConsumerErrorResult<()> {
        validate_worker_count(worker_count)?;

        let previous = self.inner.worker_count.swap(worker_count, Ordering::SeqCst);
        debug!(
            "Worker count for tenant {} changed {} -> {}",
            self.inner.tenant_id, previous, worker_count
        );

        PoolInner::spawn_workers(&self.inner);
        Ok(())
    }

    pub fn worker_count(&self) -> usize {
        self.inner.worker_count.load(Ordering::SeqCst)
    }

    pub fn pending(&self) -> usize {
        self.inner.pending()
    }

    pub fn active_workers(&self) -> usize {
        self.inner.active_workers.load(Ordering::SeqCst)
    }

    pub fn is_draining(&self) -> bool {
        self.active_workers() > 0
    }

    pub fn is_idle(&self) -> bool {
        self.inner.is_idle()
    }

    /// Messages persisted successfully since creation.
    pub fn processed_count(&self) -> u64 {
        self.inner.processed.load(Ordering::SeqCst)
    }

    /// Messages dropped after a sink failure since creation.
    pub fn failed_count(&self) -> u64 {
        self.inner.failed.load(Ordering::SeqCst)
    }

    /// Wait until the queue is empty and no loop is draining.
    ///
    /// Returns `false` if `timeout` elapses first.
    pub async fn wait_idle(&self, timeout: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;

        loop {
            let notified = self.inner.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.inner.is_idle() {
                return true;
            }

            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                return self.inner.is_idle();
            }
        }
    }
}

fn validate_worker_count(worker_count: usize) -> ConsumerErrorResult<()> {
    if worker_count == 0 || worker_count > MAX_POOL_WORKERS {
        return Err(ConsumerError::invalid_worker_count(
            worker_count,
            MAX_POOL_WORKERS,
        ));
    }
    Ok(())
}

impl PoolInner {
    fn lock_queue(&self) -> MutexGuard<'_, VecDeque<Value>> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn pending(&self) -> usize {
        self.lock_queue().len()
    }

    fn is_idle(&self) -> bool {
        self.active_workers.load(Ordering::SeqCst) == 0 && self.pending() == 0
    }

    fn pop(&self) -> Option<Value> {
        self.lock_queue().pop_front()
    }

    /// Claim one drain slot if the pool is under its target and there is
    /// more queued work than running loops. Returns the slot index.
    fn try_reserve(&self) -> Option<usize> {
        let target = self.worker_count.load(Ordering::SeqCst);
        let pending = self.pending();

        self.active_workers
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |active| {
                (active < target && active < pending).then_some(active + 1)
            })
            .ok()
    }

    fn spawn_workers(this: &Arc<Self>) {
        while let Some(slot) = this.try_reserve() {
            this.metrics.worker_started();
            let span = create_drain_span(&this.tenant_id, slot);
            let pool = Arc::clone(this);
            this.runtime.spawn(Self::drain(pool).instrument(span));
        }
    }

    async fn drain(self: Arc<Self>) {
        loop {
            if let Some(payload) = self.pop() {
                self.process(payload).await;
                continue;
            }

            let remaining = self.active_workers.fetch_sub(1, Ordering::SeqCst) - 1;

            // An enqueue may have landed after the pop but before the release
            // and seen this loop as still running.
            if self.pending() > 0 && self.try_reserve().is_some() {
                continue;
            }

            self.metrics.worker_stopped();
            if remaining == 0 && self.is_idle() {
                debug!("Worker pool for tenant {} is idle", self.tenant_id);
                self.idle.notify_waiters();
            }
            return;
        }
    }

    async fn process(&self, payload: Value) {
        let started = Instant::now();

        match self.sink.persist(&self.tenant_id, payload).await {
            Ok(stored) => {
                self.processed.fetch_add(1, Ordering::SeqCst);
                self.metrics.message_persisted(started.elapsed());
                debug!(
                    "Persisted message {} for tenant {}",
                    stored.id, self.tenant_id
                );
            }
            Err(source) => {
                self.failed.fetch_add(1, Ordering::SeqCst);
                self.metrics.message_failed();
                let err = ConsumerError::processing_failed(&self.tenant_id, source);
                error!("{}", err);
            }
        }
    }
}
