//! Input checks shared by registration, login and password reset.
//!
//! Messages are returned verbatim to clients, so they describe the rule that
//! failed and never echo the submitted value.

use crate::{CoreError, Result as CoreErrorResult};

use std::panic::Location;

use error_location::ErrorLocation;

pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MAX_PASSWORD_LENGTH: usize = 72; // bcrypt truncates beyond 72 bytes
pub const MAX_EMAIL_LENGTH: usize = 254;

/// Trim and lower-case an email so lookups are case-insensitive
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[track_caller]
pub fn validate_email(email: &str) -> CoreErrorResult<()> {
    let caller = Location::caller();
    let invalid = |message: &str| CoreError::Validation {
        message: message.to_string(),
        field: Some("email".to_string()),
        location: ErrorLocation::from(caller),
    };

    if email.is_empty() {
        return Err(invalid("email cannot be empty"));
    }
    if email.len() > MAX_EMAIL_LENGTH {
        return Err(invalid("email exceeds maximum length"));
    }

    let Some((local, domain)) = email.split_once('@') else {
        return Err(invalid("email must contain '@'"));
    };
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return Err(invalid("email is malformed"));
    }
    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return Err(invalid("email domain is malformed"));
    }
    if email.chars().any(char::is_whitespace) {
        return Err(invalid("email cannot contain whitespace"));
    }

    Ok(())
}

#[track_caller]
pub fn validate_password(password: &str) -> CoreErrorResult<()> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(CoreError::Validation {
            message: format!("password must be at least {MIN_PASSWORD_LENGTH} characters"),
            field: Some("password".to_string()),
            location: ErrorLocation::from(Location::caller()),
        });
    }
    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(CoreError::Validation {
            message: format!("password must be at most {MAX_PASSWORD_LENGTH} bytes"),
            field: Some("password".to_string()),
            location: ErrorLocation::from(Location::caller()),
        });
    }

    Ok(())
}
