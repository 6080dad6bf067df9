use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct StartConsumerRequest {
    /// Worker count; the configured default when omitted
    #[serde(default)]
    pub workers: Option<usize>,
}
