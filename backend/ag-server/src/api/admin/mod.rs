#[allow(clippy::module_inception)]
pub mod admin;
pub mod requests;
pub mod responses;
