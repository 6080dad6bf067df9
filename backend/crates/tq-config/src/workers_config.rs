use crate::{
    ConfigError, ConfigErrorResult, DEFAULT_DRAIN_TIMEOUT_SECS, DEFAULT_MAX_WORKER_COUNT,
    DEFAULT_QUEUE_CAPACITY, DEFAULT_WORKER_COUNT, MAX_DRAIN_TIMEOUT_SECS, MAX_MAX_WORKER_COUNT,
    MIN_WORKER_COUNT,
};

use serde::Deserialize;

/// Per-tenant worker pool settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WorkersConfig {
    /// Workers given to a tenant when the caller does not specify a count
    pub default_count: usize,
    /// Upper bound accepted for any tenant's worker count
    pub max_count: usize,
    /// Pending messages allowed per tenant before enqueue is rejected (0 = unbounded)
    pub queue_capacity: usize,
    /// How long shutdown waits for pools to finish queued work
    pub drain_timeout_secs: u64,
}

impl Default for WorkersConfig {
    fn default() -> Self {
        Self {
            default_count: DEFAULT_WORKER_COUNT,
            max_count: DEFAULT_MAX_WORKER_COUNT,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            drain_timeout_secs: DEFAULT_DRAIN_TIMEOUT_SECS,
        }
    }
}

impl WorkersConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        let workers_range = MIN_WORKER_COUNT..=MAX_MAX_WORKER_COUNT;
        if !workers_range.contains(&self.max_count) {
            return Err(ConfigError::invalid(
                "workers",
                format!(
                    "max_count must be {}-{}, got {}",
                    MIN_WORKER_COUNT, MAX_MAX_WORKER_COUNT, self.max_count
                ),
            ));
        }

        if !(MIN_WORKER_COUNT..=self.max_count).contains(&self.default_count) {
            return Err(ConfigError::invalid(
                "workers",
                format!(
                    "default_count must be {}-{} (max_count), got {}",
                    MIN_WORKER_COUNT, self.max_count, self.default_count
                ),
            ));
        }

        if self.drain_timeout_secs > MAX_DRAIN_TIMEOUT_SECS {
            return Err(ConfigError::invalid(
                "workers",
                format!(
                    "drain_timeout_secs must be <= {}, got {}",
                    MAX_DRAIN_TIMEOUT_SECS, self.drain_timeout_secs
                ),
            ));
        }

        Ok(())
    }
}
