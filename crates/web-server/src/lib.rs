//! # Web Server
//!
//! The HTTP surface of the service: the record routes, health check, static
//! files, and the middleware stack (rate limiting, body limit, CORS, request
//! tracing). [`run_server`] also owns the lifecycle of the database pool and
//! the job scheduler.

use axum::{
    extract::DefaultBodyLimit,
    handler::HandlerWithoutStateExt,
    middleware,
    routing::{get, post},
    Router,
};
use configuration::Settings;
use database::RecordRepository;
use scheduler::Scheduler;
use services::RecordService;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, Any, CorsLayer, ExposeHeaders},
    services::ServeDir,
    trace::TraceLayer,
};

pub mod error;
pub mod handlers;
pub mod rate_limit;
pub mod response;
pub mod validation;

use crate::error::AppError;
use crate::rate_limit::RateLimits;

pub use response::{FieldErrors, IntoPayload, Payload, WebResponse, WebResponseBuilder};

/// The shared application state that all handlers can access.
#[derive(Clone)]
pub struct AppState {
    pub records: RecordService,
}

/// Assembles the routes and middleware. Separate from [`run_server`] so tests
/// can drive the router without a listener.
pub fn build_router(state: Arc<AppState>, settings: &Settings) -> Router {
    let api = Router::new()
        .route("/api/health", get(handlers::health))
        .route("/api/my-model/create", post(handlers::create_record))
        .route("/api/my-model/random", get(handlers::random_record))
        .with_state(state);

    let mut app = if settings.static_files.enabled {
        let dir = &settings.static_files.dir;
        if !dir.is_dir() {
            tracing::warn!(dir = %dir.display(), "Static file directory does not exist.");
        }
        let files = ServeDir::new(dir).not_found_service(handlers::not_found.into_service());
        api.fallback_service(files)
    } else {
        api.fallback(handlers::not_found)
    };

    if let Some(limits) = RateLimits::new(&settings.rate_limit) {
        app = app.layer(middleware::from_fn_with_state(limits, rate_limit::limit));
    }

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods(Any)
        .allow_headers(AllowHeaders::any())
        .expose_headers(ExposeHeaders::any());

    app.layer(DefaultBodyLimit::max(settings.server.body_limit_bytes))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Connects the store, starts the scheduler and serves HTTP until Ctrl-C or
/// SIGTERM. On the way out the server drains, then the scheduler stops, then
/// the pool closes.
pub async fn run_server(settings: Settings) -> Result<(), AppError> {
    let addr = settings.server.socket_addr()?;

    let pool = database::connect(&settings.database).await?;
    database::run_migrations(&pool).await?;
    let records = RecordService::new(RecordRepository::new(
        pool.clone(),
        settings.database.random_policy,
    ));

    let scheduler = Scheduler::new();
    scheduler::jobs::register_all(&scheduler, &records, &settings.jobs).await?;
    scheduler.start().await?;

    let app = build_router(Arc::new(AppState { records }), &settings);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Web server started and listening on {}", addr);

    let served = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await;

    tracing::info!("HTTP server stopped; shutting down background work.");
    scheduler.shutdown().await;
    pool.close().await;

    served?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C.");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM.");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received.");
}
