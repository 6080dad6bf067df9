use tq_server::{AppState, ServerError, build_router, logger};

use tq_config::BrokerMode;
use tq_consumer::{
    BrokerGateway, InMemoryBroker, ManagerSettings, QueuePolicy, TenantManager,
    UnavailableGateway,
};
use tq_db::MessageRepository;

use std::error::Error;
use std::sync::Arc;

use log::{error, info, warn};
use metrics_exporter_prometheus::PrometheusBuilder;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Load and validate configuration
    let config = tq_config::Config::load()?;
    config.validate()?;

    let log_file_path = config.log_file_path()?;
    if let Some(dir) = log_file_path.as_ref().and_then(|p| p.parent()) {
        std::fs::create_dir_all(dir)?;
    }

    // Initialize logger (before any other logging)
    logger::initialize(config.logging.level, log_file_path, config.logging.colored)?;

    info!("Starting tq-server v{}", env!("CARGO_PKG_VERSION"));
    config.log_summary();

    let metrics_handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| ServerError::Metrics {
            message: e.to_string(),
        })?;

    // Open database and run migrations
    let database_path = config.database_path()?;
    let pool = tq_db::create_pool(&database_path, config.database.max_connections).await?;
    let messages = MessageRepository::new(pool.clone());

    let gateway: Arc<dyn BrokerGateway> = match config.broker.mode {
        BrokerMode::InMemory => Arc::new(InMemoryBroker::new()),
        BrokerMode::Disabled => {
            warn!("Broker disabled - all tenants run in degraded mode");
            Arc::new(UnavailableGateway)
        }
    };

    let settings = ManagerSettings {
        queue_policy: QueuePolicy::from_capacity(config.workers.queue_capacity),
        max_workers: config.workers.max_count,
        drain_timeout: config.drain_timeout(),
    };
    let manager = TenantManager::new(gateway, Arc::new(messages.clone()), settings);

    let app_state = AppState {
        manager: manager.clone(),
        messages,
        default_workers: config.workers.default_count,
        metrics: Some(metrics_handle),
    };

    let app = build_router(app_state);

    let bind_addr = config.bind_addr();
    let listener = TcpListener::bind(&bind_addr).await?;
    info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => info!("Received SIGINT (Ctrl+C), initiating graceful shutdown"),
                Err(e) => error!("Failed to listen for SIGINT: {}", e),
            }
        })
        .await?;

    let report = manager.shutdown().await;
    info!(
        "Consumers stopped: {} ({} drained, {} timed out)",
        report.stopped,
        report.drained,
        report.timed_out.len()
    );
    for tenant_id in &report.timed_out {
        warn!("Tenant {} still had queued work at shutdown", tenant_id);
    }

    pool.close().await;
    info!("Graceful shutdown complete");

    Ok(())
}
