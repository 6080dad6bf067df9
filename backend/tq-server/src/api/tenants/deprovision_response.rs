use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeprovisionResponse {
    pub tenant_id: String,
    pub consumer_stopped: bool,
    pub messages_deleted: u64,
}
