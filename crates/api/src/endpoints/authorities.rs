//! Authority (role) endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get},
};
use koinonia_common::{AppError, AppResult};
use koinonia_core::AuthorityProfile;
use serde::{Deserialize, Serialize};

use crate::{
    endpoints::require_manage_users, extractors::AuthUser, middleware::AppState,
    response::ApiResponse,
};

/// One role from the reference data.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorityResponse {
    pub id: String,
    pub category_id: String,
    pub name: String,
    pub display_name: String,
    pub level: i32,
}

/// Role catalogue response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorityListResponse {
    pub authorities: Vec<AuthorityResponse>,
}

/// The role catalogue, most senior first (team leader or above; feeds
/// the grant picker).
async fn list_authorities(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<AuthorityListResponse>> {
    require_manage_users(&state, &user.id).await?;

    let authorities = state.authority_service.catalogue().await?;

    Ok(ApiResponse::ok(AuthorityListResponse {
        authorities: authorities
            .into_iter()
            .map(|a| AuthorityResponse {
                id: a.id,
                category_id: a.category_id,
                name: a.name,
                display_name: a.display_name,
                level: a.level,
            })
            .collect(),
    }))
}

/// Resolve the caller's own roles.
async fn my_authorities(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<AuthorityProfile>> {
    let resolved = state.authority_service.resolve(&user.id).await?;
    Ok(ApiResponse::ok(resolved.to_profile()))
}

/// Resolve a member's roles: self, or team leader or above.
async fn user_authorities(
    AuthUser(caller): AuthUser,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<ApiResponse<AuthorityProfile>> {
    if caller.id != user_id {
        let resolved = state.authority_service.resolve(&caller.id).await?;
        if !resolved.can_manage_users() {
            return Err(AppError::Forbidden(
                "requires team leader or above".to_string(),
            ));
        }
    }

    let resolved = state.authority_service.resolve(&user_id).await?;
    Ok(ApiResponse::ok(resolved.to_profile()))
}

/// Grant request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrantAuthorityRequest {
    pub authority_id: String,
}

/// Grant response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrantAuthorityResponse {
    pub ok: bool,
}

/// Grant a role to a member (team leader or above). Granting an
/// already-held role refreshes its assignment metadata.
async fn grant_authority(
    AuthUser(caller): AuthUser,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(req): Json<GrantAuthorityRequest>,
) -> AppResult<ApiResponse<GrantAuthorityResponse>> {
    require_manage_users(&state, &caller.id).await?;

    state
        .authority_service
        .add_authority(&user_id, &req.authority_id, &caller.id)
        .await?;

    Ok(ApiResponse::ok(GrantAuthorityResponse { ok: true }))
}

/// Revoke a role from a member (team leader or above). Revoking a role
/// the member never held is a no-op success.
async fn revoke_authority(
    AuthUser(caller): AuthUser,
    State(state): State<AppState>,
    Path((user_id, authority_id)): Path<(String, String)>,
) -> AppResult<ApiResponse<GrantAuthorityResponse>> {
    require_manage_users(&state, &caller.id).await?;

    state
        .authority_service
        .remove_authority(&user_id, &authority_id)
        .await?;

    Ok(ApiResponse::ok(GrantAuthorityResponse { ok: true }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_authorities))
        .route("/me", get(my_authorities))
        .route("/users/{user_id}", get(user_authorities).post(grant_authority))
        .route("/users/{user_id}/{authority_id}", delete(revoke_authority))
}
