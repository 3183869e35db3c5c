use crate::Role;

use std::str::FromStr;

#[test]
fn test_role_as_str() {
    assert_eq!(Role::User.as_str(), "user");
    assert_eq!(Role::Admin.as_str(), "admin");
    assert_eq!(Role::Superadmin.as_str(), "superadmin");
}

#[test]
fn test_role_from_str() {
    assert_eq!(Role::from_str("admin").unwrap(), Role::Admin);
    assert_eq!(Role::from_str("superadmin").unwrap(), Role::Superadmin);
    assert!(Role::from_str("root").is_err());
    assert!(Role::from_str("Admin").is_err());
}

#[test]
fn test_role_ordering_is_privilege_ordering() {
    assert!(Role::Superadmin.at_least(Role::Admin));
    assert!(Role::Admin.at_least(Role::Admin));
    assert!(Role::Admin.at_least(Role::User));
    assert!(!Role::User.at_least(Role::Admin));
    assert!(!Role::Admin.at_least(Role::Superadmin));
}

#[test]
fn test_role_default() {
    assert_eq!(Role::default(), Role::User);
}
