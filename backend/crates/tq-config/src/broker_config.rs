use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// Which broker gateway the server wires up at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BrokerMode {
    /// In-process broker with per-tenant queues
    #[default]
    InMemory,
    /// No broker; every tenant runs in degraded (direct-write) mode
    Disabled,
}

impl FromStr for BrokerMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "in_memory" | "memory" => Ok(BrokerMode::InMemory),
            "disabled" | "none" | "off" => Ok(BrokerMode::Disabled),
            other => Err(format!("unknown broker mode '{other}'")),
        }
    }
}

impl fmt::Display for BrokerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BrokerMode::InMemory => write!(f, "in_memory"),
            BrokerMode::Disabled => write!(f, "disabled"),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct BrokerConfig {
    pub mode: BrokerMode,
}
