//! `/admin` handlers. Every route needs at least `admin`; role changes need
//! `superadmin`.

use crate::api::run_detached;
use crate::{
    ApiError, ApiResult, AppState, AuthUser, ClientOrigin, IdentityDto, IdentityListResponse,
    PageQuery, SecurityLogListResponse, SecurityLogQuery, SetRoleRequest,
};

use ag_core::Role;

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
};
use uuid::Uuid;

/// GET /admin/users
pub async fn list_identities(
    State(state): State<AppState>,
    user: AuthUser,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> ApiResult<Json<IdentityListResponse>> {
    user.require(Role::Admin)?;
    let Query(query) = query?;
    let (page, limit) = query.resolve()?;

    let identities = state
        .services
        .accounts
        .list_identities(page, limit)
        .await
        .map_err(|e| state.api_error(e))?;

    Ok(Json(identities.into()))
}

/// GET /admin/users/{id}
pub async fn get_identity(
    State(state): State<AppState>,
    user: AuthUser,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<IdentityDto>> {
    user.require(Role::Admin)?;
    let Path(id) = id?;

    let identity = state
        .services
        .accounts
        .get_identity(id)
        .await
        .map_err(|e| state.api_error(e))?;

    Ok(Json(identity.into()))
}

/// PATCH /admin/users/{id}/role
pub async fn set_role(
    State(state): State<AppState>,
    user: AuthUser,
    origin: ClientOrigin,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<SetRoleRequest>, JsonRejection>,
) -> ApiResult<Json<IdentityDto>> {
    user.require(Role::Superadmin)?;
    let AuthUser(actor) = user;
    let Path(id) = id?;
    let Json(body) = payload?;

    let identity = run_detached(async move {
        state
            .services
            .accounts
            .set_role(actor.id, id, body.role, &origin.ip)
            .await
            .map_err(|e| state.api_error(e))
    })
    .await?;

    Ok(Json(identity.into()))
}

/// PATCH /admin/users/{id}/disable
///
/// Also revokes every refresh token the identity holds. An admin cannot
/// disable a superadmin.
pub async fn disable_identity(
    State(state): State<AppState>,
    user: AuthUser,
    origin: ClientOrigin,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<IdentityDto>> {
    user.require(Role::Admin)?;
    let AuthUser(actor) = user;
    let Path(id) = id?;

    let identity = run_detached(async move {
        let target = state
            .services
            .accounts
            .get_identity(id)
            .await
            .map_err(|e| state.api_error(e))?;
        if !actor.role.at_least(target.role) {
            return Err(ApiError::forbidden(format!(
                "Cannot disable an identity with role {}",
                target.role
            )));
        }

        state
            .services
            .accounts
            .disable(actor.id, id, &origin.ip)
            .await
            .map_err(|e| state.api_error(e))
    })
    .await?;

    Ok(Json(identity.into()))
}

/// PATCH /admin/users/{id}/enable
pub async fn enable_identity(
    State(state): State<AppState>,
    user: AuthUser,
    origin: ClientOrigin,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<IdentityDto>> {
    user.require(Role::Admin)?;
    let AuthUser(actor) = user;
    let Path(id) = id?;

    let identity = state
        .services
        .accounts
        .enable(actor.id, id, &origin.ip)
        .await
        .map_err(|e| state.api_error(e))?;

    Ok(Json(identity.into()))
}

/// GET /admin/security-logs
pub async fn list_security_logs(
    State(state): State<AppState>,
    user: AuthUser,
    query: Result<Query<SecurityLogQuery>, QueryRejection>,
) -> ApiResult<Json<SecurityLogListResponse>> {
    user.require(Role::Admin)?;
    let Query(query) = query?;
    let (page, limit) = query.page().resolve()?;
    let filter = query.filter()?;

    let logs = state
        .services
        .accounts
        .list_security_logs(&filter, page, limit)
        .await
        .map_err(|e| state.api_error(e))?;

    Ok(Json(logs.into()))
}
