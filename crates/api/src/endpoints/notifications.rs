//! Notification endpoints.
//!
//! Wire field names here are snake_case: the mobile client's
//! notification feed predates the camelCase convention used elsewhere.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::{get, post},
};
use koinonia_common::AppResult;
use koinonia_db::entities::notification;
use serde::{Deserialize, Serialize};

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Notification record representation.
#[derive(Serialize)]
pub struct NotificationResponse {
    pub id: String,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub notification_type: String,
    pub created_at: String,
    pub is_read: bool,
    pub related_id: Option<String>,
    pub sender_id: Option<String>,
    pub sender_name: Option<String>,
}

impl From<notification::Model> for NotificationResponse {
    fn from(n: notification::Model) -> Self {
        Self {
            id: n.id,
            title: n.title,
            message: n.message,
            notification_type: n.notification_type.as_str().to_string(),
            created_at: n.created_at.to_rfc3339(),
            is_read: n.is_read,
            related_id: n.related_id,
            sender_id: n.sender_id,
            sender_name: n.sender_name,
        }
    }
}

/// Listing query.
#[derive(Debug, Deserialize)]
pub struct ListNotificationsQuery {
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

/// Notification list response.
#[derive(Serialize)]
pub struct NotificationListResponse {
    pub notifications: Vec<NotificationResponse>,
    pub unread_count: u64,
    pub page: u64,
    pub page_size: u64,
    pub has_more: bool,
}

/// Page through the caller's notifications, newest first.
async fn list_notifications(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ListNotificationsQuery>,
) -> AppResult<ApiResponse<NotificationListResponse>> {
    let page = state
        .notification_service
        .list(&user.id, query.page, query.page_size)
        .await?;

    Ok(ApiResponse::ok(NotificationListResponse {
        notifications: page.items.into_iter().map(Into::into).collect(),
        unread_count: page.unread_count,
        page: page.page,
        page_size: page.page_size,
        has_more: page.has_more,
    }))
}

/// Badge response.
#[derive(Serialize)]
pub struct BadgeResponse {
    pub unread_count: u64,
}

/// Current unread badge number.
async fn badge(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<BadgeResponse>> {
    let unread_count = state.notification_service.badge_count(&user.id).await?;
    Ok(ApiResponse::ok(BadgeResponse { unread_count }))
}

/// Mark-one-read request.
#[derive(Debug, Deserialize)]
pub struct MarkReadRequest {
    pub notification_id: String,
}

/// Mark-read response.
#[derive(Serialize)]
pub struct MarkReadResponse {
    pub unread_count: u64,
}

/// Mark one notification as read.
async fn mark_read(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<MarkReadRequest>,
) -> AppResult<ApiResponse<MarkReadResponse>> {
    state
        .notification_service
        .mark_as_read(&user.id, &req.notification_id)
        .await?;

    let unread_count = state.notification_service.badge_count(&user.id).await?;
    Ok(ApiResponse::ok(MarkReadResponse { unread_count }))
}

/// Mark every notification read.
async fn mark_all_read(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<MarkReadResponse>> {
    state.notification_service.mark_all_as_read(&user.id).await?;

    let unread_count = state.notification_service.badge_count(&user.id).await?;
    Ok(ApiResponse::ok(MarkReadResponse { unread_count }))
}

/// Mark-related request.
#[derive(Debug, Deserialize)]
pub struct MarkRelatedRequest {
    pub related_id: String,
}

/// Mark every notification about one content item read.
async fn mark_related_read(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<MarkRelatedRequest>,
) -> AppResult<ApiResponse<MarkReadResponse>> {
    state
        .notification_service
        .mark_related_as_read(&user.id, &req.related_id)
        .await?;

    let unread_count = state.notification_service.badge_count(&user.id).await?;
    Ok(ApiResponse::ok(MarkReadResponse { unread_count }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_notifications))
        .route("/badge", get(badge))
        .route("/read", post(mark_read))
        .route("/read-all", post(mark_all_read))
        .route("/read-related", post(mark_related_read))
}
