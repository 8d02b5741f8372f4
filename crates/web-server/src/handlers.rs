use crate::{error::AppError, response::WebResponse, validation::ValidatedJson, AppState};
use axum::{extract::State, response::Response};
use core_types::{NewRecord, RecordRequest};
use std::sync::Arc;

/// # POST /api/my-model/create
/// Validates the body, persists a record and returns it as stored.
pub async fn create_record(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<RecordRequest>,
) -> Response {
    let Some(id) = state.records.create(NewRecord::from(request)).await else {
        return WebResponse::error("create-failed").bad_request();
    };

    match state.records.find_by_id(id).await {
        Some(record) => WebResponse::success_with("created", &record).created(),
        None => WebResponse::error("not-found").not_found(),
    }
}

/// # GET /api/my-model/random
pub async fn random_record(State(state): State<Arc<AppState>>) -> Response {
    match state.records.get_random_row().await {
        Some(record) => WebResponse::success_with("random", &record).ok(),
        None => WebResponse::error("not-found").not_found(),
    }
}

/// # GET /api/health
/// Reports whether the store answers a trivial query.
pub async fn health(State(state): State<Arc<AppState>>) -> Result<Response, AppError> {
    state.records.repository().ping().await?;
    Ok(WebResponse::success("ok").ok())
}

/// Envelope for paths no route or static file matched.
pub async fn not_found() -> Response {
    WebResponse::error("not-found").not_found()
}
