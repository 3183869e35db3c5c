pub mod api;
pub mod app_state;
pub mod error;
pub mod health;
pub mod logger;
pub mod metrics;
pub mod routes;
pub mod settings;

#[cfg(test)]
mod tests;

pub use api::{
    admin::{
        admin::{disable_identity, enable_identity, get_identity, list_identities, list_security_logs, set_role},
        requests::{PageQuery, SecurityLogQuery, SetRoleRequest},
        responses::{IdentityListResponse, SecurityLogDto, SecurityLogListResponse},
    },
    auth::{
        auth::{
            login, logout, me, refresh, register, request_password_reset, reset_password,
            send_verification_email, verify_email,
        },
        requests::{
            EmailRequest, LoginRequest, RefreshTokenRequest, RegisterRequest, ResetPasswordRequest,
            VerifyEmailQuery,
        },
        responses::{IdentityDto, MessageResponse, TokenResponse},
    },
    error::{ApiError, Result as ApiResult},
    extractors::{auth_user::AuthUser, client_origin::ClientOrigin},
};
pub use app_state::AppState;
pub use routes::build_router;
