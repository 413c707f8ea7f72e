//! API middleware.

#![allow(missing_docs)]

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use koinonia_core::{
    AuthService, AuthorityService, CommentService, EventService, LikeService, NoticeService,
    NotificationService, OrganizationService, TeamService, TestimonyService, UserService,
};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub auth_service: AuthService,
    pub authority_service: AuthorityService,
    pub user_service: UserService,
    pub notification_service: NotificationService,
    pub notice_service: NoticeService,
    pub testimony_service: TestimonyService,
    pub comment_service: CommentService,
    pub like_service: LikeService,
    pub event_service: EventService,
    pub organization_service: OrganizationService,
    pub team_service: TeamService,
}

/// Authentication middleware.
///
/// Verifies the bearer token and loads the caller into request
/// extensions. A present-but-invalid token fails the request here,
/// distinct from "no token supplied", which is left for the
/// [`crate::extractors::AuthUser`] extractor to reject on protected
/// routes.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(auth_header) = req.headers().get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
    {
        let user = match state.auth_service.verify_access_token(token) {
            Ok(claims) => state.user_service.get(&claims.sub).await,
            Err(e) => Err(e),
        };

        match user {
            Ok(user) => {
                req.extensions_mut().insert(user);
            }
            // Expired, malformed, badly signed, or orphaned token
            Err(e) => return e.into_response(),
        }
    }

    next.run(req).await
}
