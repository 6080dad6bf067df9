use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// A message accepted into a tenant's message store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredMessage {
    pub id: Uuid,
    pub tenant_id: String,
    pub payload: Value,
    pub created_at: DateTime<Utc>,
}

impl StoredMessage {
    pub fn new(tenant_id: impl Into<String>, payload: Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            tenant_id: tenant_id.into(),
            payload,
            created_at: Utc::now(),
        }
    }
}
