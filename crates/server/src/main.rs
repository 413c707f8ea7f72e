//! Koinonia server entry point.

#![allow(clippy::expect_used)]

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{Router, middleware};
use koinonia_api::{middleware::AppState, router as api_router};
use koinonia_common::Config;
use koinonia_core::{
    AuthService, AuthorityService, CommentService, EventService, FanoutService, JobService,
    JobWorkerContext, LikeService, NoticeService, NotificationService, OrganizationService,
    PushGateway, TeamService, TestimonyService, UserService,
};
use koinonia_db::repositories::{
    AuthorityRepository, CommentRepository, EventRepository, LikeRepository, NoticeRepository,
    NotificationRepository, OrganizationRepository, RefreshTokenRepository, TeamRepository,
    TestimonyRepository, UserRepository, UserAuthorityRepository,
};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "koinonia=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting koinonia server...");

    // Load configuration
    let config = Config::load()?;

    // Connect to database and run migrations
    let db = koinonia_db::init(&config).await?;
    info!("Connected to database");

    info!("Running database migrations...");
    koinonia_db::migrate(&db).await?;
    info!("Migrations completed");

    // Initialize repositories
    let db = Arc::new(db);
    let user_repo = UserRepository::new(Arc::clone(&db));
    let authority_repo = AuthorityRepository::new(Arc::clone(&db));
    let user_authority_repo = UserAuthorityRepository::new(Arc::clone(&db));
    let refresh_token_repo = RefreshTokenRepository::new(Arc::clone(&db));
    let notification_repo = NotificationRepository::new(Arc::clone(&db));
    let notice_repo = NoticeRepository::new(Arc::clone(&db));
    let testimony_repo = TestimonyRepository::new(Arc::clone(&db));
    let comment_repo = CommentRepository::new(Arc::clone(&db));
    let like_repo = LikeRepository::new(Arc::clone(&db));
    let event_repo = EventRepository::new(Arc::clone(&db));
    let organization_repo = OrganizationRepository::new(Arc::clone(&db));
    let team_repo = TeamRepository::new(Arc::clone(&db));

    // Push gateway: constructed once here; absence of credentials only
    // degrades notification delivery, never startup
    let push_gateway = PushGateway::new(config.push.clone());

    // In-process job queue for deferred push delivery
    let job_service = JobService::new();
    let job_sender = job_service.sender();
    job_service.start(JobWorkerContext {
        push_gateway: push_gateway.clone(),
        user_repo: user_repo.clone(),
    });

    // Initialize services
    let fanout = FanoutService::new(
        user_repo.clone(),
        notification_repo.clone(),
        push_gateway,
        job_sender,
    );

    let auth_service = AuthService::new(user_repo.clone(), refresh_token_repo, &config.auth);
    let authority_service = AuthorityService::new(
        user_repo.clone(),
        authority_repo,
        user_authority_repo,
    );
    let user_service = UserService::new(user_repo.clone(), organization_repo.clone());
    let notification_service = NotificationService::new(notification_repo);
    let notice_service = NoticeService::new(notice_repo.clone(), fanout.clone());
    let testimony_service = TestimonyService::new(testimony_repo.clone(), fanout.clone());
    let comment_service = CommentService::new(
        comment_repo,
        notice_repo.clone(),
        testimony_repo.clone(),
        user_repo.clone(),
        fanout.clone(),
    );
    let like_service = LikeService::new(like_repo, notice_repo, testimony_repo, fanout);
    let event_service = EventService::new(event_repo);
    let organization_service = OrganizationService::new(organization_repo);
    let team_service = TeamService::new(team_repo, user_repo);

    // Create app state
    let state = AppState {
        auth_service,
        authority_service,
        user_service,
        notification_service,
        notice_service,
        testimony_service,
        comment_service,
        like_service,
        event_service,
        organization_service,
        team_service,
    };

    // Build router
    let app = Router::new()
        .nest("/api", api_router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            koinonia_api::middleware::auth_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start server with graceful shutdown
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
