//! In-process broker gateway.
//!
//! Keeps one queue per tenant, delivers published payloads to the queue's
//! subscriber in FIFO order and applies the handler's ack/nack outcome.
//! Payloads published while nobody is subscribed wait in the queue backlog
//! and are delivered when a subscriber arrives. A payload nacked with
//! requeue goes back to the head of the backlog and is redelivered after
//! `REDELIVERY_DELAY`, for as long as the queue has a subscriber.
//!
//! The connection can be toggled with `set_connected` and individual
//! operations can be made to fail once with `fail_next`, which is how the
//! degraded-mode and start-failure paths are exercised.

use crate::{
    BrokerGateway, ConsumerError, DeliveryHandler, DeliveryOutcome, Result as ConsumerErrorResult,
};

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use log::{debug, info, warn};
use tq_core::queue_name;

/// Pause before a requeued payload is offered to the subscriber again.
pub const REDELIVERY_DELAY: Duration = Duration::from_millis(10);

/// Broker operations that can be made to fail on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BrokerOperation {
    CreateQueue,
    DeleteQueue,
    Subscribe,
    Cancel,
    Publish,
}

#[derive(Clone)]
pub struct InMemoryBroker {
    inner: Arc<Mutex<BrokerInner>>,
    connected: Arc<AtomicBool>,
    next_tag: Arc<AtomicU64>,
}

#[derive(Default)]
struct BrokerInner {
    /// Queues by queue name
    queues: HashMap<String, InMemoryQueue>,
    /// Consumer tag -> queue name
    tags: HashMap<String, String>,
    fail_next: HashSet<BrokerOperation>,
    acked: u64,
    requeued: u64,
    dead_letters: Vec<Bytes>,
}

#[derive(Default)]
struct InMemoryQueue {
    backlog: VecDeque<Bytes>,
    consumer: Option<Subscription>,
    redelivery_scheduled: bool,
}

struct Subscription {
    tag: String,
    handler: DeliveryHandler,
}

impl Default for InMemoryBroker {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryBroker {
    /// Create a connected broker with no queues.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(BrokerInner::default())),
            connected: Arc::new(AtomicBool::new(true)),
            next_tag: Arc::new(AtomicU64::new(1)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BrokerInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_connected(&self, connected: bool) {
        let was = self.connected.swap(connected, Ordering::SeqCst);
        if was != connected {
            if connected {
                info!("In-memory broker connected");
            } else {
                warn!("In-memory broker disconnected");
            }
        }
    }

    /// Make the next call of `operation` fail with a broker error.
    pub fn fail_next(&self, operation: BrokerOperation) {
        self.lock().fail_next.insert(operation);
    }

    pub fn queue_exists(&self, tenant_id: &str) -> bool {
        self.lock().queues.contains_key(&queue_name(tenant_id))
    }

    pub fn has_consumer(&self, tenant_id: &str) -> bool {
        self.lock()
            .queues
            .get(&queue_name(tenant_id))
            .is_some_and(|q| q.consumer.is_some())
    }

    /// Payloads waiting in the tenant's queue with no subscriber to take them.
    pub fn backlog_len(&self, tenant_id: &str) -> usize {
        self.lock()
            .queues
            .get(&queue_name(tenant_id))
            .map(|q| q.backlog.len())
            .unwrap_or(0)
    }

    pub fn acked_count(&self) -> u64 {
        self.lock().acked
    }

    pub fn requeued_count(&self) -> u64 {
        self.lock().requeued
    }

    /// Deliveries rejected without requeue, in rejection order.
    pub fn dead_letters(&self) -> Vec<Bytes> {
        self.lock().dead_letters.clone()
    }

    fn ensure_connected(&self, operation: &'static str) -> ConsumerErrorResult<()> {
        if self.connected.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(ConsumerError::broker_unavailable(operation))
        }
    }

    fn take_injected_failure(
        inner: &mut BrokerInner,
        operation: BrokerOperation,
        name: &'static str,
    ) -> ConsumerErrorResult<()> {
        if inner.fail_next.remove(&operation) {
            return Err(ConsumerError::broker(name, "injected failure"));
        }
        Ok(())
    }

    /// Deliver the queue's backlog to its subscriber, oldest first.
    ///
    /// Stops at the first requeued payload and schedules another attempt.
    /// Must be called without the broker lock held.
    fn flush(&self, queue: &str) {
        loop {
            let (handler, payload) = {
                let mut inner = self.lock();
                let Some(q) = inner.queues.get_mut(queue) else {
                    return;
                };
                let Some(subscription) = &q.consumer else {
                    return;
                };
                let handler = Arc::clone(&subscription.handler);
                let Some(payload) = q.backlog.pop_front() else {
                    return;
                };
                (handler, payload)
            };

            if self.deliver(queue, &handler, payload) {
                self.schedule_redelivery(queue);
                return;
            }
        }
    }

    /// Hand one payload to `handler` and record the outcome. Returns `true`
    /// when the payload was requeued.
    ///
    /// Must be called without the broker lock held.
    fn deliver(&self, queue: &str, handler: &DeliveryHandler, payload: Bytes) -> bool {
        let outcome = handler(payload.clone());
        let mut inner = self.lock();

        match outcome {
            DeliveryOutcome::Ack => {
                inner.acked += 1;
                debug!("Delivery on {} acknowledged", queue);
                false
            }
            DeliveryOutcome::Nack { requeue: true } => {
                inner.requeued += 1;
                if let Some(q) = inner.queues.get_mut(queue) {
                    q.backlog.push_front(payload);
                }
                debug!("Delivery on {} rejected and requeued", queue);
                true
            }
            DeliveryOutcome::Nack { requeue: false } => {
                inner.dead_letters.push(payload);
                debug!("Delivery on {} rejected", queue);
                false
            }
        }
    }

    fn schedule_redelivery(&self, queue: &str) {
        {
            let mut inner = self.lock();
            let Some(q) = inner.queues.get_mut(queue) else {
                return;
            };
            if q.redelivery_scheduled {
                return;
            }
            q.redelivery_scheduled = true;
        }

        let broker = self.clone();
        let queue = queue.to_string();
        tokio::spawn(async move {
            tokio::time::sleep(REDELIVERY_DELAY).await;
            if let Some(q) = broker.lock().queues.get_mut(&queue) {
                q.redelivery_scheduled = false;
            }
            broker.flush(&queue);
        });
    }
}

#[async_trait]
impl BrokerGateway for InMemoryBroker {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn create_queue(&self, tenant_id: &str) -> ConsumerErrorResult<()> {
        self.ensure_connected("create queue")?;
        let name = queue_name(tenant_id);

        let mut inner = self.lock();
        Self::take_injected_failure(&mut inner, BrokerOperation::CreateQueue, "create queue")?;
        inner.queues.entry(name.clone()).or_default();

        info!("Created queue: {}", name);
        Ok(())
    }

    async fn delete_queue(&self, tenant_id: &str) -> ConsumerErrorResult<()> {
        self.ensure_connected("delete queue")?;
        let name = queue_name(tenant_id);

        let mut inner = self.lock();
        Self::take_injected_failure(&mut inner, BrokerOperation::DeleteQueue, "delete queue")?;

        if let Some(queue) = inner.queues.remove(&name) {
            if let Some(subscription) = queue.consumer {
                inner.tags.remove(&subscription.tag);
            }
            info!("Deleted queue: {}", name);
        }

        Ok(())
    }

    async fn subscribe(
        &self,
        tenant_id: &str,
        handler: DeliveryHandler,
    ) -> ConsumerErrorResult<String> {
        self.ensure_connected("subscribe")?;
        let name = queue_name(tenant_id);

        let tag = {
            let mut inner = self.lock();
            Self::take_injected_failure(&mut inner, BrokerOperation::Subscribe, "subscribe")?;

            let queue = inner.queues.get_mut(&name).ok_or_else(|| {
                ConsumerError::broker("subscribe", format!("queue {name} is not declared"))
            })?;

            if queue.consumer.is_some() {
                return Err(ConsumerError::broker(
                    "subscribe",
                    format!("queue {name} already has a consumer"),
                ));
            }

            let tag = format!(
                "consumer_{}_{}_{}",
                tenant_id,
                chrono::Utc::now().timestamp_millis(),
                self.next_tag.fetch_add(1, Ordering::SeqCst)
            );
            queue.consumer = Some(Subscription {
                tag: tag.clone(),
                handler: Arc::clone(&handler),
            });
            if !queue.backlog.is_empty() {
                debug!(
                    "Delivering {} backlogged messages on {}",
                    queue.backlog.len(),
                    name
                );
            }
            inner.tags.insert(tag.clone(), name.clone());
            tag
        };

        self.flush(&name);
        Ok(tag)
    }

    async fn cancel(&self, consumer_tag: &str) -> ConsumerErrorResult<()> {
        self.ensure_connected("cancel")?;

        let mut inner = self.lock();
        Self::take_injected_failure(&mut inner, BrokerOperation::Cancel, "cancel")?;

        let name = inner.tags.remove(consumer_tag).ok_or_else(|| {
            ConsumerError::broker("cancel", format!("unknown consumer tag {consumer_tag}"))
        })?;

        if let Some(queue) = inner.queues.get_mut(&name) {
            queue.consumer = None;
        }

        debug!("Cancelled consumer {} on {}", consumer_tag, name);
        Ok(())
    }

    async fn publish(&self, tenant_id: &str, payload: Bytes) -> ConsumerErrorResult<()> {
        self.ensure_connected("publish")?;
        let name = queue_name(tenant_id);

        {
            let mut inner = self.lock();
            Self::take_injected_failure(&mut inner, BrokerOperation::Publish, "publish")?;

            let queue = inner.queues.get_mut(&name).ok_or_else(|| {
                ConsumerError::broker("publish", format!("queue {name} is not declared"))
            })?;

            queue.backlog.push_back(payload);
            if queue.consumer.is_none() {
                debug!("Published message to {} (no consumer, backlogged)", name);
                return Ok(());
            }
        }

        debug!("Published message to {}", name);
        self.flush(&name);
        Ok(())
    }
}
