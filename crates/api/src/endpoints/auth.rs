//! Authentication endpoints.

use axum::{Json, Router, extract::State, routing::post};
use koinonia_common::AppResult;
use koinonia_core::user::CreateUserInput;
use serde::{Deserialize, Serialize};

use crate::{middleware::AppState, response::ApiResponse};

/// Join (registration) request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRequest {
    pub phone: String,
    pub password: String,
    pub name: String,
    pub email: Option<String>,
    pub birthday: Option<chrono::NaiveDate>,
    pub gender: Option<String>,
    pub school: Option<String>,
    pub grade: Option<String>,
}

/// Join response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinResponse {
    pub id: String,
    pub name: String,
}

/// Register a new member.
async fn join(
    State(state): State<AppState>,
    Json(req): Json<JoinRequest>,
) -> AppResult<ApiResponse<JoinResponse>> {
    let user = state
        .user_service
        .join(CreateUserInput {
            phone: req.phone,
            password: req.password,
            name: req.name,
            email: req.email,
            birthday: req.birthday,
            gender: req.gender,
            school: req.school,
            grade: req.grade,
        })
        .await?;

    Ok(ApiResponse::ok(JoinResponse {
        id: user.id,
        name: user.name,
    }))
}

/// Login request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub phone: String,
    pub password: String,
}

/// Login response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub id: String,
    pub name: String,
    pub access_token: String,
    pub refresh_token: String,
}

/// Sign in with phone and password.
async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<ApiResponse<LoginResponse>> {
    let (user, pair) = state.auth_service.login(&req.phone, &req.password).await?;

    Ok(ApiResponse::ok(LoginResponse {
        id: user.id,
        name: user.name,
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
    }))
}

/// Refresh request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Exchange a refresh token for a fresh credential pair.
async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> AppResult<ApiResponse<LoginResponse>> {
    let (user, pair) = state.auth_service.refresh(&req.refresh_token).await?;

    Ok(ApiResponse::ok(LoginResponse {
        id: user.id,
        name: user.name,
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
    }))
}

/// Logout request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoutRequest {
    pub refresh_token: String,
}

/// Logout response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoutResponse {
    pub ok: bool,
}

/// Invalidate a refresh token.
async fn logout(
    State(state): State<AppState>,
    Json(req): Json<LogoutRequest>,
) -> AppResult<ApiResponse<LogoutResponse>> {
    state.auth_service.logout(&req.refresh_token).await?;
    Ok(ApiResponse::ok(LogoutResponse { ok: true }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/join", post(join))
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/logout", post(logout))
}
