//! Molio document generator library logic.
//!
//! Builds a Molio "bygningsdelsbeskrivelse" as a SQLite file, gzips it and
//! serves it as a download. [`assemble`] populates the document,
//! [`output`] packages it, and [`api`] exposes it over HTTP.

pub mod api;
pub mod assemble;
pub mod config;
pub mod output;

use axum::{routing::get, Extension, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

/// Application state shared across all request handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Loaded configuration.
    pub config: config::Config,
}

/// Builds the application router with all routes.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route("/molio.db.gz", get(api::download_handler))
        .layer(TraceLayer::new_for_http())
        .layer(Extension(Arc::new(state)))
}

/// Installs the global tracing subscriber.
///
/// Logs go to stderr so `molio-export` can stream the archive on stdout.
pub fn init_tracing(logging: &config::LoggingConfig) {
    let filter = EnvFilter::try_new(&logging.level).unwrap_or_else(|_| EnvFilter::new("info"));

    if logging.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}
