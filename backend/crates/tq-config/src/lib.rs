mod broker_config;
mod config;
mod database_config;
mod error;
mod log_level;
mod logging_config;
mod server_config;
mod workers_config;

#[cfg(test)]
mod tests;

pub use broker_config::{BrokerConfig, BrokerMode};
pub use config::Config;
pub use database_config::DatabaseConfig;
pub use error::{ConfigError, ConfigErrorResult};
pub use log_level::LogLevel;
pub use logging_config::LoggingConfig;
pub use server_config::ServerConfig;
pub use workers_config::WorkersConfig;

const CONFIG_DIR_ENV: &str = "TQ_CONFIG_DIR";
const CONFIG_DIR_NAME: &str = ".tq";
const CONFIG_FILE_NAME: &str = "config.toml";

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 5000;
const MIN_PORT: u16 = 1024;

const DEFAULT_DATABASE_FILENAME: &str = "messages.db";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;
const MAX_DB_MAX_CONNECTIONS: u32 = 64;

const DEFAULT_LOG_LEVEL: log::LevelFilter = log::LevelFilter::Info;
const DEFAULT_LOG_DIRECTORY: &str = "log";
const DEFAULT_LOG_COLORED: bool = true;

const DEFAULT_WORKER_COUNT: usize = 3;
const MIN_WORKER_COUNT: usize = 1;
const DEFAULT_MAX_WORKER_COUNT: usize = 64;
const MAX_MAX_WORKER_COUNT: usize = 1024;
/// 0 means the per-tenant queue is unbounded.
const DEFAULT_QUEUE_CAPACITY: usize = 0;
const DEFAULT_DRAIN_TIMEOUT_SECS: u64 = 30;
const MAX_DRAIN_TIMEOUT_SECS: u64 = 600;
