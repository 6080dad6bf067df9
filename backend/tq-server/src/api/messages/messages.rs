//! Message REST API handlers

use crate::{ApiError, ApiResult, AppState, ListMessagesQuery, PublishResponse, TenantId};

use tq_core::MessagePage;
use tq_db::{DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use serde_json::Value;

/// POST /api/v1/tenants/{tenant_id}/messages
///
/// Accept any JSON payload for the tenant. Returns 202 with the route the
/// message took.
pub async fn publish_message(
    State(state): State<AppState>,
    TenantId(tenant_id): TenantId,
    Json(payload): Json<Value>,
) -> ApiResult<(StatusCode, Json<PublishResponse>)> {
    let route = state.manager.publish(&tenant_id, payload).await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(PublishResponse::new(tenant_id, route)),
    ))
}

/// GET /api/v1/tenants/{tenant_id}/messages?cursor=&limit=
///
/// Newest-first page of persisted messages
pub async fn list_messages(
    State(state): State<AppState>,
    TenantId(tenant_id): TenantId,
    Query(query): Query<ListMessagesQuery>,
) -> ApiResult<Json<MessagePage>> {
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_LIMIT);
    if !(1..=MAX_PAGE_LIMIT).contains(&limit) {
        return Err(ApiError::validation(
            format!("limit must be between 1 and {}", MAX_PAGE_LIMIT),
            Some("limit"),
        ));
    }

    let page = state
        .messages
        .find_by_tenant(&tenant_id, query.cursor.as_deref(), limit)
        .await?;

    Ok(Json(page))
}
