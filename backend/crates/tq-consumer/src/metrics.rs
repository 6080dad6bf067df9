use metrics::{counter, gauge, histogram};

/// Metrics collector for tenant consumers and worker pools
#[derive(Clone)]
pub struct Metrics {
    prefix: &'static str,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            prefix: "tq_consumer",
        }
    }

    pub fn consumer_started(&self, degraded: bool) {
        counter!(format!("{}.consumers.started", self.prefix)).increment(1);
        if degraded {
            counter!(format!("{}.consumers.started.degraded", self.prefix)).increment(1);
        }
        gauge!(format!("{}.consumers.active", self.prefix)).increment(1.0);
    }

    pub fn consumer_stopped(&self) {
        counter!(format!("{}.consumers.stopped", self.prefix)).increment(1);
        gauge!(format!("{}.consumers.active", self.prefix)).decrement(1.0);
    }

    pub fn consumer_start_failed(&self) {
        counter!(format!("{}.consumers.start_failed", self.prefix)).increment(1);
    }

    pub fn duplicate_start(&self) {
        counter!(format!("{}.consumers.duplicate_start", self.prefix)).increment(1);
    }

    pub fn concurrency_updated(&self, worker_count: usize) {
        counter!(format!("{}.consumers.concurrency_updated", self.prefix)).increment(1);
        histogram!(format!("{}.consumers.worker_count", self.prefix)).record(worker_count as f64);
    }

    /// Record a message accepted into a pool queue
    pub fn message_enqueued(&self, depth: usize) {
        counter!(format!("{}.messages.enqueued", self.prefix)).increment(1);
        histogram!(format!("{}.queue.depth", self.prefix)).record(depth as f64);
    }

    pub fn message_rejected(&self) {
        counter!(format!("{}.messages.rejected", self.prefix)).increment(1);
    }

    /// Record a message persisted through the sink, with its persist latency
    pub fn message_persisted(&self, duration: std::time::Duration) {
        counter!(format!("{}.messages.persisted", self.prefix)).increment(1);
        histogram!(format!("{}.messages.persist_latency_ms", self.prefix))
            .record(duration.as_millis() as f64);
    }

    pub fn message_failed(&self) {
        counter!(format!("{}.messages.failed", self.prefix)).increment(1);
    }

    pub fn direct_write(&self) {
        counter!(format!("{}.messages.direct_write", self.prefix)).increment(1);
    }

    pub fn delivery_acked(&self) {
        counter!(format!("{}.deliveries.acked", self.prefix)).increment(1);
    }

    pub fn delivery_nacked(&self, reason: &str) {
        counter!(format!("{}.deliveries.nacked", self.prefix)).increment(1);
        counter!(format!("{}.deliveries.nacked.{}", self.prefix, reason)).increment(1);
    }

    pub fn worker_started(&self) {
        gauge!(format!("{}.workers.active", self.prefix)).increment(1.0);
    }

    pub fn worker_stopped(&self) {
        gauge!(format!("{}.workers.active", self.prefix)).decrement(1.0);
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
