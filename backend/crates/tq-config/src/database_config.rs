use crate::{
    ConfigError, ConfigErrorResult, DEFAULT_DATABASE_FILENAME, DEFAULT_DB_MAX_CONNECTIONS,
    MAX_DB_MAX_CONNECTIONS,
};

use std::path::{Component, Path};

use serde::Deserialize;

/// SQLite message store location and pool size.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// File name relative to the config directory
    pub path: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: DEFAULT_DATABASE_FILENAME.to_string(),
            max_connections: DEFAULT_DB_MAX_CONNECTIONS,
        }
    }
}

impl DatabaseConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        if self.path.trim().is_empty() {
            return Err(ConfigError::invalid("database", "path must not be empty"));
        }

        // Keep the store inside the config directory
        let escapes = Path::new(&self.path)
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return Err(ConfigError::invalid(
                "database",
                format!("path must be relative without '..', got {}", self.path),
            ));
        }

        if self.max_connections == 0 || self.max_connections > MAX_DB_MAX_CONNECTIONS {
            return Err(ConfigError::invalid(
                "database",
                format!(
                    "max_connections must be 1-{}, got {}",
                    MAX_DB_MAX_CONNECTIONS, self.max_connections
                ),
            ));
        }

        Ok(())
    }
}
