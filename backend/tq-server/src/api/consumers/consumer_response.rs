use tq_core::ConsumerStatus;

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ConsumerResponse {
    pub consumer: ConsumerStatus,
}
