//! Comment endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use koinonia_common::{AppError, AppResult};
use koinonia_db::entities::comment::ContentType;
use koinonia_core::comment::{CommentView, CreateCommentInput};
use serde::{Deserialize, Serialize};

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Listing query: which content item's thread to fetch.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListCommentsQuery {
    pub target_type: String,
    pub target_id: String,
}

fn parse_target_type(raw: &str) -> AppResult<ContentType> {
    match raw {
        "notice" => Ok(ContentType::Notice),
        "testimony" => Ok(ContentType::Testimony),
        other => Err(AppError::Validation(format!(
            "unknown target_type: {other}"
        ))),
    }
}

/// Comment list response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentListResponse {
    pub comments: Vec<CommentView>,
}

/// Thread for one content item, oldest first.
async fn list_comments(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ListCommentsQuery>,
) -> AppResult<ApiResponse<CommentListResponse>> {
    let target_type = parse_target_type(&query.target_type)?;
    let comments = state
        .comment_service
        .list(target_type, &query.target_id)
        .await?;

    Ok(ApiResponse::ok(CommentListResponse { comments }))
}

/// Create request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    pub target_type: String,
    pub target_id: String,
    pub parent_id: Option<String>,
    pub content: String,
}

/// Created-comment response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: String,
    pub target_id: String,
    pub parent_id: Option<String>,
    pub content: String,
    pub created_at: String,
}

/// Comment on a notice or testimony (or reply to a comment). The owner
/// of the target is notified unless they are the commenter.
async fn create_comment(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreateCommentRequest>,
) -> AppResult<ApiResponse<CommentResponse>> {
    let target_type = parse_target_type(&req.target_type)?;

    let (comment, status) = state
        .comment_service
        .create(
            &user,
            CreateCommentInput {
                target_type,
                target_id: req.target_id,
                parent_id: req.parent_id,
                content: req.content,
            },
        )
        .await?;

    Ok(ApiResponse::ok_with_warning(
        CommentResponse {
            id: comment.id,
            target_id: comment.target_id,
            parent_id: comment.parent_id,
            content: comment.content,
            created_at: comment.created_at.to_rfc3339(),
        },
        status.warning(),
    ))
}

/// Delete response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResponse {
    pub ok: bool,
}

/// Delete a comment (author, or master).
async fn delete_comment(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<DeleteResponse>> {
    let resolved = state.authority_service.resolve(&user.id).await?;

    state
        .comment_service
        .delete(&user.id, resolved.is_master(), &id)
        .await?;

    Ok(ApiResponse::ok(DeleteResponse { ok: true }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_comments).post(create_comment))
        .route("/{id}", axum::routing::delete(delete_comment))
}
