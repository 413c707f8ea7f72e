//! Team endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use koinonia_common::AppResult;
use koinonia_db::entities::team;
use koinonia_core::team::{CreateTeamInput, TeamView};
use serde::{Deserialize, Serialize};

use crate::{
    endpoints::require_manage_users, extractors::AuthUser, middleware::AppState,
    response::ApiResponse,
};

/// Team summary response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamResponse {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub leader_id: Option<String>,
}

impl From<team::Model> for TeamResponse {
    fn from(t: team::Model) -> Self {
        Self {
            id: t.id,
            name: t.name,
            description: t.description,
            leader_id: t.leader_id,
        }
    }
}

/// Team list response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamListResponse {
    pub teams: Vec<TeamResponse>,
}

/// All teams.
async fn list_teams(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<TeamListResponse>> {
    let teams = state.team_service.list().await?;
    Ok(ApiResponse::ok(TeamListResponse {
        teams: teams.into_iter().map(Into::into).collect(),
    }))
}

/// The caller's teams.
async fn my_teams(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<TeamListResponse>> {
    let teams = state.team_service.list_for_user(&user.id).await?;
    Ok(ApiResponse::ok(TeamListResponse {
        teams: teams.into_iter().map(Into::into).collect(),
    }))
}

/// Create request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTeamRequest {
    pub name: String,
    pub description: Option<String>,
    pub leader_id: Option<String>,
}

/// Create a team (team leader or above).
async fn create_team(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreateTeamRequest>,
) -> AppResult<ApiResponse<TeamResponse>> {
    require_manage_users(&state, &user.id).await?;

    let team = state
        .team_service
        .create(CreateTeamInput {
            name: req.name,
            description: req.description,
            leader_id: req.leader_id,
        })
        .await?;

    Ok(ApiResponse::ok(team.into()))
}

/// A team with its roster.
async fn get_team(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<TeamView>> {
    let team = state.team_service.get(&id).await?;
    Ok(ApiResponse::ok(team))
}

/// Membership request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddMemberRequest {
    pub user_id: String,
}

/// Membership response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipResponse {
    pub ok: bool,
}

/// Add a member (team leader or above). Adding twice is a no-op.
async fn add_member(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<AddMemberRequest>,
) -> AppResult<ApiResponse<MembershipResponse>> {
    require_manage_users(&state, &user.id).await?;

    state.team_service.add_member(&id, &req.user_id).await?;
    Ok(ApiResponse::ok(MembershipResponse { ok: true }))
}

/// Remove a member (team leader or above). Removing a non-member is a
/// no-op.
async fn remove_member(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path((id, user_id)): Path<(String, String)>,
) -> AppResult<ApiResponse<MembershipResponse>> {
    require_manage_users(&state, &user.id).await?;

    state.team_service.remove_member(&id, &user_id).await?;
    Ok(ApiResponse::ok(MembershipResponse { ok: true }))
}

/// Delete a team and its memberships (team leader or above).
async fn delete_team(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<MembershipResponse>> {
    require_manage_users(&state, &user.id).await?;

    state.team_service.delete(&id).await?;
    Ok(ApiResponse::ok(MembershipResponse { ok: true }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_teams).post(create_team))
        .route("/me", get(my_teams))
        .route("/{id}", get(get_team).delete(delete_team))
        .route("/{id}/members", axum::routing::post(add_member))
        .route("/{id}/members/{user_id}", axum::routing::delete(remove_member))
}
