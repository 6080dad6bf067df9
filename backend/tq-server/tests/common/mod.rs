#![allow(dead_code)]

//! Test infrastructure for tq-server API tests

use tq_consumer::{
    BrokerGateway, InMemoryBroker, ManagerSettings, QueuePolicy, TenantManager,
    UnavailableGateway,
};
use tq_db::MessageRepository;
use tq_server::{AppState, build_router};

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tower::ServiceExt;

pub const DEFAULT_WORKERS: usize = 3;
pub const WAIT: Duration = Duration::from_secs(5);

/// Create a test pool with in-memory SQLite
pub async fn create_test_pool() -> SqlitePool {
    let options = SqliteConnectOptions::new()
        .filename(":memory:")
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .expect("Failed to create test database");

    tq_db::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}

fn test_settings() -> ManagerSettings {
    ManagerSettings {
        queue_policy: QueuePolicy::Unbounded,
        max_workers: 8,
        drain_timeout: Duration::from_secs(1),
    }
}

async fn create_state(gateway: Arc<dyn BrokerGateway>) -> AppState {
    let pool = create_test_pool().await;
    let messages = MessageRepository::new(pool);
    let manager = TenantManager::new(gateway, Arc::new(messages.clone()), test_settings());

    AppState {
        manager,
        messages,
        default_workers: DEFAULT_WORKERS,
        metrics: None,
    }
}

/// AppState backed by a connected in-memory broker
pub async fn create_test_app_state() -> (AppState, InMemoryBroker) {
    let broker = InMemoryBroker::new();
    let state = create_state(Arc::new(broker.clone())).await;
    (state, broker)
}

/// AppState with no broker, so every tenant runs degraded
pub async fn create_degraded_app_state() -> AppState {
    create_state(Arc::new(UnavailableGateway)).await
}

/// Send one request through a fresh router and decode the JSON body
/// (Null when the body is empty or not JSON).
pub async fn send(state: &AppState, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let app = build_router(state.clone());

    let request = match body {
        Some(json) => Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    (status, json)
}

/// Wait until the tenant's pool has persisted everything it was given.
pub async fn settle(state: &AppState, tenant_id: &str) {
    if let Some(pool) = state.manager.pool(tenant_id).await {
        assert!(pool.wait_idle(WAIT).await, "pool for {tenant_id} never went idle");
    }
}
