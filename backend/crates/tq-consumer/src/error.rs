use tq_core::{CoreError, ErrorLocation};

use std::panic::Location;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConsumerError {
    #[error("Consumer for tenant {tenant_id} already exists {location}")]
    AlreadyExists {
        tenant_id: String,
        location: ErrorLocation,
    },

    #[error("Consumer for tenant {tenant_id} not found {location}")]
    NotFound {
        tenant_id: String,
        location: ErrorLocation,
    },

    #[error("Failed to start consumer for tenant {tenant_id}: {message} {location}")]
    StartFailed {
        tenant_id: String,
        message: String,
        location: ErrorLocation,
    },

    #[error("Invalid worker count {requested} (must be 1-{max}) {location}")]
    InvalidWorkerCount {
        requested: usize,
        max: usize,
        location: ErrorLocation,
    },

    #[error("Queue for tenant {tenant_id} is full ({capacity} pending) {location}")]
    QueueFull {
        tenant_id: String,
        capacity: usize,
        location: ErrorLocation,
    },

    #[error("Processing failed for tenant {tenant_id}: {source} {location}")]
    ProcessingFailed {
        tenant_id: String,
        #[source]
        source: CoreError,
        location: ErrorLocation,
    },

    #[error("Broker unavailable, cannot {operation} {location}")]
    BrokerUnavailable {
        operation: &'static str,
        location: ErrorLocation,
    },

    #[error("Broker error during {operation}: {message} {location}")]
    Broker {
        operation: &'static str,
        message: String,
        location: ErrorLocation,
    },

    #[error("Message sink error: {source} {location}")]
    Sink {
        #[source]
        source: CoreError,
        location: ErrorLocation,
    },

    #[error("Payload encoding failed: {source} {location}")]
    Encode {
        #[source]
        source: serde_json::Error,
        location: ErrorLocation,
    },

    #[error("Internal error: {message} {location}")]
    Internal {
        message: String,
        location: ErrorLocation,
    },
}

impl ConsumerError {
    #[track_caller]
    pub fn already_exists(tenant_id: &str) -> Self {
        Self::AlreadyExists {
            tenant_id: tenant_id.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn not_found(tenant_id: &str) -> Self {
        Self::NotFound {
            tenant_id: tenant_id.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn broker_unavailable(operation: &'static str) -> Self {
        Self::BrokerUnavailable {
            operation,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn broker<S: Into<String>>(operation: &'static str, message: S) -> Self {
        Self::Broker {
            operation,
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn start_failed<S: Into<String>>(tenant_id: &str, message: S) -> Self {
        Self::StartFailed {
            tenant_id: tenant_id.to_string(),
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn invalid_worker_count(requested: usize, max: usize) -> Self {
        Self::InvalidWorkerCount {
            requested,
            max,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn queue_full(tenant_id: &str, capacity: usize) -> Self {
        Self::QueueFull {
            tenant_id: tenant_id.to_string(),
            capacity,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn processing_failed(tenant_id: &str, source: CoreError) -> Self {
        Self::ProcessingFailed {
            tenant_id: tenant_id.to_string(),
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// True when the error only reflects the broker being unreachable
    /// (degraded mode) rather than a real failure.
    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::BrokerUnavailable { .. })
    }

    /// Stable machine-readable code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::AlreadyExists { .. } => "ALREADY_EXISTS",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::StartFailed { .. } => "START_FAILED",
            Self::InvalidWorkerCount { .. } => "VALIDATION_ERROR",
            Self::QueueFull { .. } => "QUEUE_FULL",
            Self::ProcessingFailed { .. } => "PROCESSING_FAILED",
            Self::BrokerUnavailable { .. } => "BROKER_UNAVAILABLE",
            Self::Broker { .. } => "BROKER_ERROR",
            Self::Sink { .. } => "SINK_ERROR",
            Self::Encode { .. } => "ENCODE_ERROR",
            Self::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}

impl From<CoreError> for ConsumerError {
    #[track_caller]
    fn from(source: CoreError) -> Self {
        Self::Sink {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<serde_json::Error> for ConsumerError {
    #[track_caller]
    fn from(source: serde_json::Error) -> Self {
        Self::Encode {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

pub type Result<T> = std::result::Result<T, ConsumerError>;
