//! REST API error types
//!
//! These errors are designed to produce consistent JSON responses
//! with appropriate HTTP status codes.

use tq_consumer::ConsumerError;
use tq_db::DbError;

use std::panic::Location;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use error_location::ErrorLocation;
use serde::Serialize;
use thiserror::Error;

/// JSON error response body
#[derive(Debug, Serialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}

/// Inner error body with code, message, and optional field
#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    /// Machine-readable error code (e.g., "NOT_FOUND", "VALIDATION_ERROR")
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Field name if this is a validation error for a specific field
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

/// API errors with associated HTTP status codes
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {message} {location}")]
    NotFound {
        message: String,
        location: ErrorLocation,
    },

    /// Validation error (400)
    #[error("Validation failed: {message} {location}")]
    Validation {
        message: String,
        field: Option<String>,
        location: ErrorLocation,
    },

    /// Resource already exists (409)
    #[error("Already exists: {message} {location}")]
    AlreadyExists {
        message: String,
        location: ErrorLocation,
    },

    /// Tenant queue is at capacity (503)
    #[error("Queue full: {message} {location}")]
    QueueFull {
        message: String,
        location: ErrorLocation,
    },

    /// Internal server error (500)
    #[error("Internal error: {message} {location}")]
    Internal {
        message: String,
        location: ErrorLocation,
    },
}

impl ApiError {
    #[track_caller]
    pub fn validation<S: Into<String>>(message: S, field: Option<&str>) -> Self {
        Self::Validation {
            message: message.into(),
            field: field.map(str::to_string),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Internal { .. } => log::error!("{}", self),
            _ => log::debug!("{}", self),
        }

        let (status, code, message, field) = match self {
            ApiError::NotFound { message, .. } => {
                (StatusCode::NOT_FOUND, "NOT_FOUND", message, None)
            }
            ApiError::Validation { message, field, .. } => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", message, field)
            }
            ApiError::AlreadyExists { message, .. } => {
                (StatusCode::CONFLICT, "ALREADY_EXISTS", message, None)
            }
            ApiError::QueueFull { message, .. } => {
                (StatusCode::SERVICE_UNAVAILABLE, "QUEUE_FULL", message, None)
            }
            ApiError::Internal { message, .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                message,
                None,
            ),
        };

        let body = ApiErrorBody {
            code: code.into(),
            message,
            field,
        };

        (status, Json(ApiErrorResponse { error: body })).into_response()
    }
}

/// Convert registry errors to API errors
impl From<ConsumerError> for ApiError {
    #[track_caller]
    fn from(e: ConsumerError) -> Self {
        let location = ErrorLocation::from(Location::caller());

        match e {
            ConsumerError::NotFound { tenant_id, .. } => ApiError::NotFound {
                message: format!("No consumer for tenant {}", tenant_id),
                location,
            },
            ConsumerError::AlreadyExists { tenant_id, .. } => ApiError::AlreadyExists {
                message: format!("Consumer for tenant {} already exists", tenant_id),
                location,
            },
            ConsumerError::InvalidWorkerCount { requested, max, .. } => ApiError::Validation {
                message: format!("workers must be between 1 and {} (got {})", max, requested),
                field: Some("workers".to_string()),
                location,
            },
            ConsumerError::QueueFull {
                tenant_id,
                capacity,
                ..
            } => ApiError::QueueFull {
                message: format!(
                    "Queue for tenant {} is full ({} pending), retry later",
                    tenant_id, capacity
                ),
                location,
            },
            other => {
                log::error!("Consumer error ({}): {}", other.error_code(), other);
                ApiError::Internal {
                    message: format!("Consumer operation failed ({})", other.error_code()),
                    location,
                }
            }
        }
    }
}

/// Convert database errors to API errors
impl From<DbError> for ApiError {
    #[track_caller]
    fn from(e: DbError) -> Self {
        let location = ErrorLocation::from(Location::caller());

        match e {
            DbError::InvalidCursor { cursor, .. } => ApiError::Validation {
                message: format!("Unknown cursor {}", cursor),
                field: Some("cursor".to_string()),
                location,
            },
            other => {
                // Don't expose internal database details to clients
                log::error!("Database error: {}", other);
                ApiError::Internal {
                    message: "Database operation failed".to_string(),
                    location,
                }
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
