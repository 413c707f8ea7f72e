//! API endpoints.

mod auth;
mod authorities;
mod comments;
mod events;
mod notices;
mod notifications;
mod organization;
mod teams;
mod testimonies;
mod users;

use axum::Router;
use koinonia_common::{AppError, AppResult};
use koinonia_core::ResolvedAuthoritySet;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .nest("/authorities", authorities::router())
        .nest("/notices", notices::router())
        .nest("/testimonies", testimonies::router())
        .nest("/comments", comments::router())
        .nest("/events", events::router())
        .nest("/notifications", notifications::router())
        .nest("/organization", organization::router())
        .nest("/teams", teams::router())
}

/// Resolve the caller's roles and require team-leader-or-above.
pub(crate) async fn require_manage_users(
    state: &AppState,
    user_id: &str,
) -> AppResult<ResolvedAuthoritySet> {
    let resolved = state.authority_service.resolve(user_id).await?;
    if !resolved.can_manage_users() {
        return Err(AppError::Forbidden(
            "requires team leader or above".to_string(),
        ));
    }
    Ok(resolved)
}
