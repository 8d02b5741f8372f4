use crate::response::WebResponse;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Infrastructure failures of the server itself: startup, storage
/// reachability, scheduling. Request-level outcomes never use this type; they
/// are rendered directly as envelopes by the handlers.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] database::DbError),
    #[error("Configuration error: {0}")]
    Config(#[from] configuration::error::ConfigError),
    #[error("Scheduler error: {0}")]
    Scheduler(#[from] scheduler::error::SchedulerError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Converts our custom `AppError` into an HTTP response.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Database(db_err) => {
                tracing::error!(error = %db_err, "Database error.");
                WebResponse::error("database-unavailable").service_unavailable()
            }
            other => {
                tracing::error!(error = %other, "Internal error.");
                WebResponse::error("internal-error").internal_server_error()
            }
        }
    }
}
