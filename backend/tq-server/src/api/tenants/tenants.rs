//! Tenant-level REST API handlers

use crate::{ApiResult, AppState, DeprovisionResponse, TenantId, TenantStatusResponse};

use axum::{Json, extract::State};
use log::{info, warn};

/// GET /api/v1/tenants/{tenant_id}
///
/// Whether the tenant has a consumer and how many messages it has stored
pub async fn get_tenant_status(
    State(state): State<AppState>,
    TenantId(tenant_id): TenantId,
) -> ApiResult<Json<TenantStatusResponse>> {
    let consumer_active = state.manager.get_status(&tenant_id).await.is_some();
    let message_count = state.messages.count_by_tenant(&tenant_id).await?;

    Ok(Json(TenantStatusResponse {
        tenant_id,
        consumer_active,
        message_count,
    }))
}

/// DELETE /api/v1/tenants/{tenant_id}
///
/// Stop the tenant's consumer, let its queued work finish, then purge its
/// messages.
pub async fn deprovision_tenant(
    State(state): State<AppState>,
    TenantId(tenant_id): TenantId,
) -> ApiResult<Json<DeprovisionResponse>> {
    let pool = state.manager.pool(&tenant_id).await;
    let consumer_stopped = state.manager.stop_consumer(&tenant_id).await;

    if let Some(pool) = pool {
        let timeout = state.manager.settings().drain_timeout;
        if !pool.wait_idle(timeout).await {
            warn!(
                "Pool for tenant {} still busy after {:?}, purging anyway",
                tenant_id, timeout
            );
        }
    }

    let messages_deleted = state.messages.delete_by_tenant(&tenant_id).await?;
    info!(
        "Deprovisioned tenant {} (consumer stopped: {}, {} messages deleted)",
        tenant_id, consumer_stopped, messages_deleted
    );

    Ok(Json(DeprovisionResponse {
        tenant_id,
        consumer_stopped,
        messages_deleted,
    }))
}
