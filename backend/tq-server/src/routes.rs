use crate::{
    AppState, deprovision_tenant, get_consumer, get_tenant_status, health, list_consumers,
    list_messages, publish_message, start_consumer, stop_consumer, update_concurrency,
};

use axum::{
    Router,
    routing::{get, put},
};
use tower_http::cors::{Any, CorsLayer};

/// Build the application router with all endpoints
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health check endpoints
        .route("/health", get(health::health))
        .route("/live", get(health::liveness))
        .route("/ready", get(health::readiness))
        .route("/metrics", get(health::metrics))
        // Tenants
        .route(
            "/api/v1/tenants/{tenant_id}",
            get(get_tenant_status).delete(deprovision_tenant),
        )
        // Consumer lifecycle
        .route("/api/v1/consumers", get(list_consumers))
        .route(
            "/api/v1/tenants/{tenant_id}/consumer",
            get(get_consumer).post(start_consumer).delete(stop_consumer),
        )
        .route(
            "/api/v1/tenants/{tenant_id}/consumer/concurrency",
            put(update_concurrency),
        )
        // Messages
        .route(
            "/api/v1/tenants/{tenant_id}/messages",
            get(list_messages).post(publish_message),
        )
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}
