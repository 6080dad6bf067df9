use crate::ErrorLocation;

use std::panic::Location;
use std::result::Result as StdResult;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Message sink error for tenant {tenant_id}: {message} {location}")]
    Sink {
        tenant_id: String,
        message: String,
        location: ErrorLocation,
    },
}

impl CoreError {
    #[track_caller]
    pub fn sink<S: Into<String>>(tenant_id: &str, message: S) -> Self {
        Self::Sink {
            tenant_id: tenant_id.to_string(),
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

pub type Result<T> = StdResult<T, CoreError>;
