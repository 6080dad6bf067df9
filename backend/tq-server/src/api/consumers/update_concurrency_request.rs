use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct UpdateConcurrencyRequest {
    pub workers: usize,
}
