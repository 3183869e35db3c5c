use crate::{AuthError, Result as AuthErrorResult};

use ag_core::Role;

use std::panic::Location;

use error_location::ErrorLocation;

/// The only authorization check: one comparison on the role ordering.
#[track_caller]
pub fn require_role(actual: Role, required: Role) -> AuthErrorResult<()> {
    if actual.at_least(required) {
        Ok(())
    } else {
        Err(AuthError::Forbidden {
            required,
            location: ErrorLocation::from(Location::caller()),
        })
    }
}
