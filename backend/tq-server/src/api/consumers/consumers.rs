//! Consumer lifecycle REST API handlers

use crate::{
    ApiError, ApiResult, AppState, ConsumerListResponse, ConsumerResponse, StartConsumerRequest,
    StopConsumerResponse, TenantId, UpdateConcurrencyRequest,
};

use std::panic::Location;

use axum::{Json, body::Bytes, extract::State, http::StatusCode};
use error_location::ErrorLocation;

/// GET /api/v1/consumers
///
/// Status of every registered consumer, sorted by tenant
pub async fn list_consumers(State(state): State<AppState>) -> Json<ConsumerListResponse> {
    let mut consumers = state.manager.get_all_statuses().await;
    consumers.sort_by(|a, b| a.tenant_id.cmp(&b.tenant_id));

    Json(ConsumerListResponse {
        consumers,
        broker_connected: state.manager.is_broker_connected(),
    })
}

/// GET /api/v1/tenants/{tenant_id}/consumer
pub async fn get_consumer(
    State(state): State<AppState>,
    TenantId(tenant_id): TenantId,
) -> ApiResult<Json<ConsumerResponse>> {
    let consumer = state
        .manager
        .get_status(&tenant_id)
        .await
        .ok_or_else(|| ApiError::NotFound {
            message: format!("No consumer for tenant {}", tenant_id),
            location: ErrorLocation::from(Location::caller()),
        })?;

    Ok(Json(ConsumerResponse { consumer }))
}

/// POST /api/v1/tenants/{tenant_id}/consumer
///
/// Start a consumer. The body is optional; `{"workers": n}` overrides the
/// configured default.
pub async fn start_consumer(
    State(state): State<AppState>,
    TenantId(tenant_id): TenantId,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<ConsumerResponse>)> {
    let request = if body.is_empty() {
        StartConsumerRequest::default()
    } else {
        serde_json::from_slice::<StartConsumerRequest>(&body)
            .map_err(|e| ApiError::validation(format!("Invalid request body: {}", e), None))?
    };

    let workers = request.workers.unwrap_or(state.default_workers);
    let consumer = state.manager.start_consumer(&tenant_id, workers).await?;

    Ok((StatusCode::CREATED, Json(ConsumerResponse { consumer })))
}

/// PUT /api/v1/tenants/{tenant_id}/consumer/concurrency
///
/// Change the worker count, starting a consumer if the tenant has none
pub async fn update_concurrency(
    State(state): State<AppState>,
    TenantId(tenant_id): TenantId,
    Json(request): Json<UpdateConcurrencyRequest>,
) -> ApiResult<Json<ConsumerResponse>> {
    let consumer = state
        .manager
        .reconfigure_or_start(&tenant_id, request.workers)
        .await?;

    Ok(Json(ConsumerResponse { consumer }))
}

/// DELETE /api/v1/tenants/{tenant_id}/consumer
pub async fn stop_consumer(
    State(state): State<AppState>,
    TenantId(tenant_id): TenantId,
) -> Json<StopConsumerResponse> {
    let stopped = state.manager.stop_consumer(&tenant_id).await;

    Json(StopConsumerResponse { tenant_id, stopped })
}
