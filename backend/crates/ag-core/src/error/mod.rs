use std::result::Result as StdResult;

use error_location::ErrorLocation;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Validation error: {message} {location}")]
    Validation {
        message: String,
        field: Option<String>,
        location: ErrorLocation,
    },

    #[error("Invalid role: {value} {location}")]
    InvalidRole {
        value: String,
        location: ErrorLocation,
    },

    #[error("Invalid attempt kind: {value} {location}")]
    InvalidAttemptKind {
        value: String,
        location: ErrorLocation,
    },

    #[error("Invalid {name}: {value} {location}")]
    InvalidPolicy {
        name: &'static str,
        value: String,
        location: ErrorLocation,
    },

    #[error("Invalid security event kind: {value} {location}")]
    InvalidSecurityEventKind {
        value: String,
        location: ErrorLocation,
    },
}

pub type Result<T> = StdResult<T, CoreError>;
