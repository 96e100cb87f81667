//! regfeed server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::middleware;
use regfeed_api::{RateLimiterState, middleware::AppState, router as api_router};
use regfeed_common::Config;
use regfeed_core::{
    AdminService, AuthService, FeedbackService, LogService, RatingService, RegionService,
    TokenConfig, UserService,
};
use regfeed_db::repositories::{
    AdminRepository, FeedbackRepository, LogRepository, RatingRepository, RegionRepository,
    UserRepository,
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

#[allow(clippy::expect_used)]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "regfeed=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting regfeed server...");

    // Load configuration. A malformed credential lifetime is fatal here,
    // never a per-request error.
    let config = Config::load()?;
    let token_config = TokenConfig::from_config(&config.auth)?;

    // Connect to database and run migrations
    let db = regfeed_db::init(&config).await?;
    info!("Connected to database");

    info!("Running database migrations...");
    regfeed_db::migrate(&db).await?;
    info!("Migrations completed");

    // Initialize repositories
    let db = Arc::new(db);
    let admin_repo = AdminRepository::new(Arc::clone(&db));
    let region_repo = RegionRepository::new(Arc::clone(&db));
    let rating_repo = RatingRepository::new(Arc::clone(&db));
    let feedback_repo = FeedbackRepository::new(Arc::clone(&db));
    let user_repo = UserRepository::new(Arc::clone(&db));
    let log_repo = LogRepository::new(Arc::clone(&db));

    // Initialize services
    let log_service = LogService::new(log_repo);
    let user_service = UserService::new(user_repo, feedback_repo.clone());
    let auth_service = AuthService::new(admin_repo.clone(), log_service.clone(), token_config);
    let admin_service = AdminService::new(admin_repo.clone(), region_repo.clone());
    let rating_service = RatingService::new(
        rating_repo.clone(),
        region_repo.clone(),
        log_service.clone(),
    );
    let feedback_service = FeedbackService::new(
        feedback_repo,
        region_repo.clone(),
        rating_repo.clone(),
        user_service.clone(),
        log_service.clone(),
    );
    let region_service = RegionService::new(region_repo, rating_repo, admin_repo);

    // Ensure the configured super admin exists (idempotent)
    admin_service
        .ensure_bootstrap_admin(&config.bootstrap.admin_email, &config.bootstrap.admin_password)
        .await?;

    // Create app state
    let state = AppState {
        auth_service,
        admin_service,
        rating_service,
        feedback_service,
        region_service,
        user_service,
        log_service,
    };

    // Initialize the per-IP rate limiter
    let rate_limiter = RateLimiterState::new();

    // Build router
    let app = api_router()
        .layer(middleware::from_fn_with_state(
            rate_limiter,
            regfeed_api::rate_limit::rate_limit_middleware,
        ))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            regfeed_api::middleware::auth_middleware,
        ))
        .layer(middleware::from_fn(
            regfeed_api::middleware::error_envelope_middleware,
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
    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
