//! Notice endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use koinonia_common::AppResult;
use koinonia_db::entities::{comment::ContentType, notice};
use koinonia_core::notice::{CreateNoticeInput, UpdateNoticeInput};
use serde::{Deserialize, Serialize};

use crate::{
    endpoints::require_manage_users, extractors::AuthUser, middleware::AppState,
    response::ApiResponse,
};

/// Notice response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoticeResponse {
    pub id: String,
    pub author_id: String,
    pub title: String,
    pub content: String,
    pub is_pinned: bool,
    pub created_at: String,
    pub updated_at: Option<String>,
}

impl From<notice::Model> for NoticeResponse {
    fn from(n: notice::Model) -> Self {
        Self {
            id: n.id,
            author_id: n.author_id,
            title: n.title,
            content: n.content,
            is_pinned: n.is_pinned,
            created_at: n.created_at.to_rfc3339(),
            updated_at: n.updated_at.map(|dt| dt.to_rfc3339()),
        }
    }
}

/// Pagination query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
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

/// Notice list response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoticeListResponse {
    pub notices: Vec<NoticeResponse>,
    pub page: u64,
    pub page_size: u64,
    pub has_more: bool,
}

/// List notices, pinned first.
async fn list_notices(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<ApiResponse<NoticeListResponse>> {
    let (notices, has_more) = state.notice_service.list(query.page, query.page_size).await?;

    Ok(ApiResponse::ok(NoticeListResponse {
        notices: notices.into_iter().map(Into::into).collect(),
        page: query.page.max(1),
        page_size: query.page_size.clamp(1, 100),
        has_more,
    }))
}

/// Create request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNoticeRequest {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub is_pinned: bool,
}

/// Create a notice and broadcast it (team leader or above). The
/// response may carry an advisory warning when push delivery was
/// skipped.
async fn create_notice(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreateNoticeRequest>,
) -> AppResult<ApiResponse<NoticeResponse>> {
    require_manage_users(&state, &user.id).await?;

    let (notice, status) = state
        .notice_service
        .create(
            &user,
            CreateNoticeInput {
                title: req.title,
                content: req.content,
                is_pinned: req.is_pinned,
            },
        )
        .await?;

    Ok(ApiResponse::ok_with_warning(
        notice.into(),
        status.warning(),
    ))
}

/// Get a notice; opening it clears related notifications for the caller.
async fn get_notice(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<NoticeResponse>> {
    let notice = state.notice_service.get(&id).await?;

    if let Err(e) = state
        .notification_service
        .mark_related_as_read(&user.id, &id)
        .await
    {
        tracing::warn!(error = %e, "Failed to mark related notifications read");
    }

    Ok(ApiResponse::ok(notice.into()))
}

/// Update request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNoticeRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub is_pinned: Option<bool>,
}

/// Sparse-update a notice (team leader or above).
async fn update_notice(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateNoticeRequest>,
) -> AppResult<ApiResponse<NoticeResponse>> {
    require_manage_users(&state, &user.id).await?;

    let notice = state
        .notice_service
        .update(
            &id,
            UpdateNoticeInput {
                title: req.title,
                content: req.content,
                is_pinned: req.is_pinned,
            },
        )
        .await?;

    Ok(ApiResponse::ok(notice.into()))
}

/// Delete response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResponse {
    pub ok: bool,
}

/// Delete a notice with its comments and likes (team leader or above).
async fn delete_notice(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<DeleteResponse>> {
    require_manage_users(&state, &user.id).await?;

    state.notice_service.delete(&id).await?;
    Ok(ApiResponse::ok(DeleteResponse { ok: true }))
}

/// Like summary response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeSummaryResponse {
    pub count: u64,
    pub liked_by_me: bool,
}

/// Like a notice. Liking twice is a no-op; the author is notified
/// unless they liked their own notice.
async fn like_notice(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<LikeSummaryResponse>> {
    state
        .like_service
        .like(&user, ContentType::Notice, &id)
        .await?;

    let summary = state
        .like_service
        .summary(&user.id, ContentType::Notice, &id)
        .await?;
    Ok(ApiResponse::ok(LikeSummaryResponse {
        count: summary.count,
        liked_by_me: summary.liked_by_me,
    }))
}

/// Remove a like from a notice.
async fn unlike_notice(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<LikeSummaryResponse>> {
    state
        .like_service
        .unlike(&user.id, ContentType::Notice, &id)
        .await?;

    let summary = state
        .like_service
        .summary(&user.id, ContentType::Notice, &id)
        .await?;
    Ok(ApiResponse::ok(LikeSummaryResponse {
        count: summary.count,
        liked_by_me: summary.liked_by_me,
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_notices).post(create_notice))
        .route(
            "/{id}",
            get(get_notice).patch(update_notice).delete(delete_notice),
        )
        .route("/{id}/like", axum::routing::post(like_notice).delete(unlike_notice))
}
