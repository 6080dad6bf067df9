use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StopConsumerResponse {
    pub tenant_id: String,
    /// False when the tenant had no consumer
    pub stopped: bool,
}
