use crate::{
    BrokerConfig, CONFIG_DIR_ENV, CONFIG_DIR_NAME, CONFIG_FILE_NAME, ConfigError,
    ConfigErrorResult, DatabaseConfig, LoggingConfig, ServerConfig, WorkersConfig,
};

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use log::{info, warn};
use serde::Deserialize;

/// Server configuration: `config.toml` in the config directory, then
/// `TQ_*` environment overrides on top.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub broker: BrokerConfig,
    pub workers: WorkersConfig,
}

impl Config {
    /// Load from the config directory, creating it on first run.
    ///
    /// A missing `config.toml` means defaults. Does not validate; call
    /// `validate()` afterwards.
    pub fn load() -> ConfigErrorResult<Self> {
        let dir = Self::config_dir()?;
        std::fs::create_dir_all(&dir).map_err(|source| ConfigError::CreateDir {
            path: dir.clone(),
            source,
        })?;

        let file = dir.join(CONFIG_FILE_NAME);
        let mut config = if file.is_file() {
            Self::from_file(&file)?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    fn from_file(path: &Path) -> ConfigErrorResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// `TQ_CONFIG_DIR` when set, otherwise `.tq` under the working directory.
    pub fn config_dir() -> ConfigErrorResult<PathBuf> {
        match std::env::var_os(CONFIG_DIR_ENV) {
            Some(dir) => Ok(PathBuf::from(dir)),
            None => std::env::current_dir()
                .map(|cwd| cwd.join(CONFIG_DIR_NAME))
                .map_err(|e| ConfigError::config_dir(format!("no working directory: {e}"))),
        }
    }

    pub fn validate(&self) -> ConfigErrorResult<()> {
        self.server.validate()?;
        self.database.validate()?;
        self.workers.validate()
    }

    pub fn database_path(&self) -> ConfigErrorResult<PathBuf> {
        Ok(Self::config_dir()?.join(&self.database.path))
    }

    pub fn log_file_path(&self) -> ConfigErrorResult<Option<PathBuf>> {
        Ok(self.logging.file_path(&Self::config_dir()?))
    }

    pub fn bind_addr(&self) -> String {
        self.server.bind_addr()
    }

    pub fn drain_timeout(&self) -> Duration {
        Duration::from_secs(self.workers.drain_timeout_secs)
    }

    pub fn log_summary(&self) {
        let queue = match self.workers.queue_capacity {
            0 => "unbounded".to_string(),
            capacity => capacity.to_string(),
        };

        info!("Configuration:");
        info!("  listen      {}", self.bind_addr());
        info!(
            "  database    {} (max {} connections)",
            self.database.path, self.database.max_connections
        );
        info!(
            "  logging     {} ({})",
            *self.logging.level,
            self.logging.file.as_deref().unwrap_or("stdout")
        );
        info!("  broker      {}", self.broker.mode);
        info!(
            "  workers     default {}, max {}, queue {}, drain timeout {}s",
            self.workers.default_count,
            self.workers.max_count,
            queue,
            self.workers.drain_timeout_secs
        );
    }

    fn apply_env_overrides(&mut self) {
        override_from_env("TQ_SERVER_HOST", &mut self.server.host);
        override_from_env("TQ_SERVER_PORT", &mut self.server.port);

        override_from_env("TQ_DATABASE_PATH", &mut self.database.path);
        override_from_env("TQ_DB_MAX_CONNECTIONS", &mut self.database.max_connections);

        override_from_env("TQ_LOG_LEVEL", &mut self.logging.level);
        override_from_env("TQ_LOG_COLORED", &mut self.logging.colored);
        if let Ok(file) = std::env::var("TQ_LOG_FILE") {
            self.logging.file = Some(file);
        }

        override_from_env("TQ_BROKER_MODE", &mut self.broker.mode);

        override_from_env("TQ_DEFAULT_WORKERS", &mut self.workers.default_count);
        override_from_env("TQ_MAX_WORKERS", &mut self.workers.max_count);
        override_from_env("TQ_QUEUE_CAPACITY", &mut self.workers.queue_capacity);
        override_from_env("TQ_DRAIN_TIMEOUT_SECS", &mut self.workers.drain_timeout_secs);
    }
}

/// Replace `target` with the parsed value of `var`. Unparseable values are
/// logged and ignored.
fn override_from_env<T: FromStr>(var: &str, target: &mut T) {
    let Ok(raw) = std::env::var(var) else {
        return;
    };

    match raw.trim().parse() {
        Ok(value) => *target = value,
        Err(_) => warn!("Ignoring {}={:?}: not a valid value", var, raw),
    }
}
