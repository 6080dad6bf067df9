use tq_core::ConsumerStatus;

use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumerListResponse {
    pub consumers: Vec<ConsumerStatus>,
    pub broker_connected: bool,
}
