use tq_consumer::TenantManager;
use tq_db::MessageRepository;

use metrics_exporter_prometheus::PrometheusHandle;

/// Shared state handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    pub manager: TenantManager,
    pub messages: MessageRepository,
    /// Worker count used when a start request does not name one
    pub default_workers: usize,
    /// Prometheus render handle; None when no recorder is installed
    pub metrics: Option<PrometheusHandle>,
}
