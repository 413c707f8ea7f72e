//! Event endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use chrono::{DateTime, Utc};
use koinonia_common::AppResult;
use koinonia_db::entities::event;
use koinonia_core::event::{CreateEventInput, UpdateEventInput};
use serde::{Deserialize, Serialize};

use crate::{
    endpoints::require_manage_users, extractors::AuthUser, middleware::AppState,
    response::ApiResponse,
};

/// Event response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventResponse {
    pub id: String,
    pub author_id: String,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub starts_at: String,
    pub ends_at: Option<String>,
    pub created_at: String,
}

impl From<event::Model> for EventResponse {
    fn from(e: event::Model) -> Self {
        Self {
            id: e.id,
            author_id: e.author_id,
            title: e.title,
            description: e.description,
            location: e.location,
            starts_at: e.starts_at.to_rfc3339(),
            ends_at: e.ends_at.map(|dt| dt.to_rfc3339()),
            created_at: e.created_at.to_rfc3339(),
        }
    }
}

/// Listing query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListEventsQuery {
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

/// Event list response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventListResponse {
    pub events: Vec<EventResponse>,
    pub page: u64,
    pub page_size: u64,
    pub has_more: bool,
}

/// Page through all events.
async fn list_events(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ListEventsQuery>,
) -> AppResult<ApiResponse<EventListResponse>> {
    let (events, has_more) = state.event_service.list(query.page, query.page_size).await?;

    Ok(ApiResponse::ok(EventListResponse {
        events: events.into_iter().map(Into::into).collect(),
        page: query.page.max(1),
        page_size: query.page_size.clamp(1, 100),
        has_more,
    }))
}

/// Upcoming query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpcomingQuery {
    #[serde(default = "default_page_size")]
    pub limit: u64,
}

/// Upcoming events response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpcomingEventsResponse {
    pub events: Vec<EventResponse>,
}

/// Upcoming events, soonest first.
async fn upcoming_events(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
    Query(query): Query<UpcomingQuery>,
) -> AppResult<ApiResponse<UpcomingEventsResponse>> {
    let events = state.event_service.list_upcoming(query.limit).await?;

    Ok(ApiResponse::ok(UpcomingEventsResponse {
        events: events.into_iter().map(Into::into).collect(),
    }))
}

/// Create request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
}

/// Create an event (team leader or above).
async fn create_event(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreateEventRequest>,
) -> AppResult<ApiResponse<EventResponse>> {
    require_manage_users(&state, &user.id).await?;

    let event = state
        .event_service
        .create(
            &user,
            CreateEventInput {
                title: req.title,
                description: req.description,
                location: req.location,
                starts_at: req.starts_at,
                ends_at: req.ends_at,
            },
        )
        .await?;

    Ok(ApiResponse::ok(event.into()))
}

/// Get an event.
async fn get_event(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<EventResponse>> {
    let event = state.event_service.get(&id).await?;
    Ok(ApiResponse::ok(event.into()))
}

/// Update request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
}

/// Sparse-update an event (team leader or above).
async fn update_event(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateEventRequest>,
) -> AppResult<ApiResponse<EventResponse>> {
    require_manage_users(&state, &user.id).await?;

    let event = state
        .event_service
        .update(
            &id,
            UpdateEventInput {
                title: req.title,
                description: req.description,
                location: req.location,
                starts_at: req.starts_at,
                ends_at: req.ends_at,
            },
        )
        .await?;

    Ok(ApiResponse::ok(event.into()))
}

/// Delete response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResponse {
    pub ok: bool,
}

/// Delete an event (team leader or above).
async fn delete_event(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<DeleteResponse>> {
    require_manage_users(&state, &user.id).await?;

    state.event_service.delete(&id).await?;
    Ok(ApiResponse::ok(DeleteResponse { ok: true }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_events).post(create_event))
        .route("/upcoming", get(upcoming_events))
        .route(
            "/{id}",
            get(get_event).patch(update_event).delete(delete_event),
        )
}
