//! Testimony endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use koinonia_common::AppResult;
use koinonia_db::entities::{comment::ContentType, testimony};
use koinonia_core::testimony::{CreateTestimonyInput, UpdateTestimonyInput};
use serde::{Deserialize, Serialize};

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Testimony response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestimonyResponse {
    pub id: String,
    pub author_id: String,
    pub title: String,
    pub content: String,
    pub created_at: String,
    pub updated_at: Option<String>,
}

impl From<testimony::Model> for TestimonyResponse {
    fn from(t: testimony::Model) -> Self {
        Self {
            id: t.id,
            author_id: t.author_id,
            title: t.title,
            content: t.content,
            created_at: t.created_at.to_rfc3339(),
            updated_at: t.updated_at.map(|dt| dt.to_rfc3339()),
        }
    }
}

/// Listing query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTestimoniesQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_page_size")]
    pub page_size: u64,
    /// Narrow to one member's testimonies.
    pub author_id: Option<String>,
}

const fn default_page() -> u64 {
    1
}

const fn default_page_size() -> u64 {
    20
}

/// Testimony list response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestimonyListResponse {
    pub testimonies: Vec<TestimonyResponse>,
    pub page: u64,
    pub page_size: u64,
    pub has_more: bool,
}

/// List testimonies, newest first.
async fn list_testimonies(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ListTestimoniesQuery>,
) -> AppResult<ApiResponse<TestimonyListResponse>> {
    let (testimonies, has_more) = state
        .testimony_service
        .list(query.author_id.as_deref(), query.page, query.page_size)
        .await?;

    Ok(ApiResponse::ok(TestimonyListResponse {
        testimonies: testimonies.into_iter().map(Into::into).collect(),
        page: query.page.max(1),
        page_size: query.page_size.clamp(1, 100),
        has_more,
    }))
}

/// Create request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTestimonyRequest {
    pub title: String,
    pub content: String,
}

/// Share a testimony; any member may. Broadcast fan-out may degrade to
/// an advisory warning.
async fn create_testimony(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreateTestimonyRequest>,
) -> AppResult<ApiResponse<TestimonyResponse>> {
    let (testimony, status) = state
        .testimony_service
        .create(
            &user,
            CreateTestimonyInput {
                title: req.title,
                content: req.content,
            },
        )
        .await?;

    Ok(ApiResponse::ok_with_warning(
        testimony.into(),
        status.warning(),
    ))
}

/// Get a testimony; opening it clears related notifications.
async fn get_testimony(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<TestimonyResponse>> {
    let testimony = state.testimony_service.get(&id).await?;

    if let Err(e) = state
        .notification_service
        .mark_related_as_read(&user.id, &id)
        .await
    {
        tracing::warn!(error = %e, "Failed to mark related notifications read");
    }

    Ok(ApiResponse::ok(testimony.into()))
}

/// Update request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTestimonyRequest {
    pub title: Option<String>,
    pub content: Option<String>,
}

/// Sparse-update a testimony (author, or master).
async fn update_testimony(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateTestimonyRequest>,
) -> AppResult<ApiResponse<TestimonyResponse>> {
    let resolved = state.authority_service.resolve(&user.id).await?;

    let testimony = state
        .testimony_service
        .update(
            &user.id,
            resolved.is_master(),
            &id,
            UpdateTestimonyInput {
                title: req.title,
                content: req.content,
            },
        )
        .await?;

    Ok(ApiResponse::ok(testimony.into()))
}

/// Delete response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResponse {
    pub ok: bool,
}

/// Delete a testimony (author, or master).
async fn delete_testimony(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<DeleteResponse>> {
    let resolved = state.authority_service.resolve(&user.id).await?;

    state
        .testimony_service
        .delete(&user.id, resolved.is_master(), &id)
        .await?;

    Ok(ApiResponse::ok(DeleteResponse { ok: true }))
}

/// Like summary response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeSummaryResponse {
    pub count: u64,
    pub liked_by_me: bool,
}

/// Like a testimony.
async fn like_testimony(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<LikeSummaryResponse>> {
    state
        .like_service
        .like(&user, ContentType::Testimony, &id)
        .await?;

    let summary = state
        .like_service
        .summary(&user.id, ContentType::Testimony, &id)
        .await?;
    Ok(ApiResponse::ok(LikeSummaryResponse {
        count: summary.count,
        liked_by_me: summary.liked_by_me,
    }))
}

/// Remove a like from a testimony.
async fn unlike_testimony(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<LikeSummaryResponse>> {
    state
        .like_service
        .unlike(&user.id, ContentType::Testimony, &id)
        .await?;

    let summary = state
        .like_service
        .summary(&user.id, ContentType::Testimony, &id)
        .await?;
    Ok(ApiResponse::ok(LikeSummaryResponse {
        count: summary.count,
        liked_by_me: summary.liked_by_me,
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_testimonies).post(create_testimony))
        .route(
            "/{id}",
            get(get_testimony)
                .patch(update_testimony)
                .delete(delete_testimony),
        )
        .route(
            "/{id}/like",
            axum::routing::post(like_testimony).delete(unlike_testimony),
        )
}
