//! HTTP handlers for the Molio document generator.

use crate::{output, AppState};
use axum::{
    extract::{Extension, Json},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{json, Value};
use std::sync::Arc;
use thiserror::Error;

/// API error type mapping to HTTP status codes.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("internal server error: {0}")]
    InternalServerError(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::InternalServerError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

/// Handler for `GET /health`.
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Handler for `GET /molio.db.gz`.
///
/// Builds a fresh reference document for every request and returns it as a
/// gzip archive. A failed build returns `500` without any archive bytes.
pub async fn download_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Response, ApiError> {
    let build_state = state.clone();
    let archive = tokio::task::spawn_blocking(move || output::build_archive(&build_state.config))
        .await
        .map_err(|e| ApiError::InternalServerError(format!("task join error: {}", e)))?
        .map_err(|e| {
            tracing::error!("document build failed: {}", e);
            ApiError::InternalServerError(format!("document build failed: {}", e))
        })?;

    Ok(output::download_response(archive, &state.config.response))
}
