use tq_consumer::PublishRoute;

use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishResponse {
    pub tenant_id: String,
    /// "broker", "worker_pool" or "direct"
    pub route: &'static str,
}

impl PublishResponse {
    pub fn new(tenant_id: String, route: PublishRoute) -> Self {
        let route = match route {
            PublishRoute::Broker => "broker",
            PublishRoute::WorkerPool => "worker_pool",
            PublishRoute::Direct => "direct",
        };
        Self { tenant_id, route }
    }
}
