use crate::{AuthError, require_role};

use ag_core::Role;

#[test]
fn given_sufficient_role_when_required_then_ok() {
    assert!(require_role(Role::Superadmin, Role::Admin).is_ok());
    assert!(require_role(Role::Admin, Role::Admin).is_ok());
    assert!(require_role(Role::User, Role::User).is_ok());
}

#[test]
fn given_insufficient_role_when_required_then_forbidden_names_requirement() {
    let result = require_role(Role::Admin, Role::Superadmin);

    assert!(matches!(
        result,
        Err(AuthError::Forbidden {
            required: Role::Superadmin,
            ..
        })
    ));
}
