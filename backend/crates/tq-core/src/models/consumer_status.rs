use serde::{Deserialize, Serialize};

/// Point-in-time view of one tenant consumer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumerStatus {
    pub tenant_id: String,
    pub consumer_tag: String,
    pub worker_count: usize,
    pub active: bool,
    pub broker_connected: bool,
}
