//! User endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, put},
};
use koinonia_common::{AppError, AppResult};
use koinonia_db::entities::user;
use koinonia_core::user::{PlacementInput, UpdateUserInput};
use serde::{Deserialize, Serialize};

use crate::{
    endpoints::require_manage_users, extractors::AuthUser, middleware::AppState,
    response::ApiResponse,
};

/// User profile response. The password hash and push token never leave
/// the server.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub phone: String,
    pub name: String,
    pub email: Option<String>,
    pub birthday: Option<chrono::NaiveDate>,
    pub gender: Option<String>,
    pub school: Option<String>,
    pub grade: Option<String>,
    pub branch_id: Option<String>,
    pub region_id: Option<String>,
    pub group_id: Option<String>,
    pub authority: Option<String>,
    pub created_at: String,
}

impl From<user::Model> for UserResponse {
    fn from(u: user::Model) -> Self {
        Self {
            id: u.id,
            phone: u.phone,
            name: u.name,
            email: u.email,
            birthday: u.birthday,
            gender: u.gender,
            school: u.school,
            grade: u.grade,
            branch_id: u.branch_id,
            region_id: u.region_id,
            group_id: u.group_id,
            authority: u.authority,
            created_at: u.created_at.to_rfc3339(),
        }
    }
}

/// Get the caller's own profile.
async fn me(AuthUser(user): AuthUser) -> AppResult<ApiResponse<UserResponse>> {
    Ok(ApiResponse::ok(user.into()))
}

/// Sparse profile patch.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMeRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub birthday: Option<chrono::NaiveDate>,
    pub gender: Option<String>,
    pub school: Option<String>,
    pub grade: Option<String>,
}

/// Update the caller's own profile; only present fields are applied.
async fn update_me(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<UpdateMeRequest>,
) -> AppResult<ApiResponse<UserResponse>> {
    let updated = state
        .user_service
        .update(
            &user.id,
            UpdateUserInput {
                name: req.name,
                email: req.email,
                birthday: req.birthday,
                gender: req.gender,
                school: req.school,
                grade: req.grade,
            },
        )
        .await?;

    Ok(ApiResponse::ok(updated.into()))
}

/// Push-token registration request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushTokenRequest {
    /// `null` clears the stored token.
    pub push_token: Option<String>,
}

/// Push-token registration response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PushTokenResponse {
    pub ok: bool,
}

/// Register (or clear) the caller's device push token.
async fn update_push_token(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<PushTokenRequest>,
) -> AppResult<ApiResponse<PushTokenResponse>> {
    state
        .user_service
        .update_push_token(&user.id, req.push_token)
        .await?;

    Ok(ApiResponse::ok(PushTokenResponse { ok: true }))
}

/// Directory listing query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListUsersQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_page_size")]
    pub page_size: u64,
}

const fn default_page() -> u64 {
    1
}

const fn default_page_size() -> u64 {
    20
}

/// Directory listing response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserListResponse {
    pub users: Vec<UserResponse>,
    pub total: u64,
}

/// Member directory (team leader or above).
async fn list_users(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ListUsersQuery>,
) -> AppResult<ApiResponse<UserListResponse>> {
    require_manage_users(&state, &user.id).await?;

    let (users, total) = state.user_service.list(query.page, query.page_size).await?;

    Ok(ApiResponse::ok(UserListResponse {
        users: users.into_iter().map(Into::into).collect(),
        total,
    }))
}

/// A member's profile: self, or team leader or above.
async fn get_user(
    AuthUser(caller): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<UserResponse>> {
    if caller.id != id {
        let resolved = state.authority_service.resolve(&caller.id).await?;
        if !resolved.can_manage_users() {
            return Err(AppError::Forbidden(
                "requires team leader or above".to_string(),
            ));
        }
    }

    let user = state.user_service.get(&id).await?;
    Ok(ApiResponse::ok(user.into()))
}

/// Placement assignment request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementRequest {
    pub branch_id: Option<String>,
    pub region_id: Option<String>,
    pub group_id: Option<String>,
}

/// Assign a member's organizational placement (team leader or above).
async fn assign_placement(
    AuthUser(caller): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<PlacementRequest>,
) -> AppResult<ApiResponse<UserResponse>> {
    require_manage_users(&state, &caller.id).await?;

    let updated = state
        .user_service
        .assign_placement(
            &id,
            PlacementInput {
                branch_id: req.branch_id,
                region_id: req.region_id,
                group_id: req.group_id,
            },
        )
        .await?;

    Ok(ApiResponse::ok(updated.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users))
        .route("/me", get(me).patch(update_me))
        .route("/me/push-token", put(update_push_token))
        .route("/{id}", get(get_user))
        .route("/{id}/placement", put(assign_placement))
}
