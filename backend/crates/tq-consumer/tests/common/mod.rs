#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use tq_consumer::{InMemoryBroker, ManagerSettings, TenantManager, UnavailableGateway};
use tq_core::InMemorySink;

pub const WAIT: Duration = Duration::from_secs(5);

pub struct TestHarness {
    pub manager: TenantManager,
    pub sink: InMemorySink,
    pub broker: Option<InMemoryBroker>,
}

/// Manager backed by a connected in-memory broker
pub fn connected_manager() -> TestHarness {
    connected_manager_with(ManagerSettings::default())
}

pub fn connected_manager_with(settings: ManagerSettings) -> TestHarness {
    let sink = InMemorySink::new();
    let broker = InMemoryBroker::new();
    let manager = TenantManager::new(
        Arc::new(broker.clone()),
        Arc::new(sink.clone()),
        settings,
    );
    TestHarness {
        manager,
        sink,
        broker: Some(broker),
    }
}

/// Manager with no broker at all (permanent degraded mode)
pub fn degraded_manager() -> TestHarness {
    degraded_manager_with(ManagerSettings::default())
}

pub fn degraded_manager_with(settings: ManagerSettings) -> TestHarness {
    let sink = InMemorySink::new();
    let manager = TenantManager::new(
        Arc::new(UnavailableGateway),
        Arc::new(sink.clone()),
        settings,
    );
    TestHarness {
        manager,
        sink,
        broker: None,
    }
}

impl TestHarness {
    pub fn broker(&self) -> &InMemoryBroker {
        self.broker
            .as_ref()
            .expect("harness was built without a broker")
    }

    /// Wait for the tenant's pool to go idle
    pub async fn settle(&self, tenant_id: &str) {
        let pool = self
            .manager
            .pool(tenant_id)
            .await
            .expect("tenant should have a consumer");
        assert!(pool.wait_idle(WAIT).await, "pool for {tenant_id} did not drain");
    }
}

/// Poll `check` until it holds or `WAIT` runs out
pub async fn eventually<F: Fn() -> bool>(check: F) -> bool {
    let deadline = tokio::time::Instant::now() + WAIT;
    while tokio::time::Instant::now() < deadline {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    check()
}
