use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantStatusResponse {
    pub tenant_id: String,
    pub consumer_active: bool,
    /// Persisted messages for the tenant
    pub message_count: i64,
}
