//! Molio server binary.
//!
//! Serves freshly generated Molio documents over HTTP until it receives
//! SIGINT or SIGTERM.
//!
//! ```text
//! molio-server [CONFIG]
//! ```

use molio_server::{app, config, init_tracing, AppState};
use std::net::SocketAddr;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() {
    let (config_path, config_source) = config::resolve_config_path(
        std::env::args().nth(1),
        std::env::var("MOLIO_CONFIG_PATH").ok(),
    );

    let config = config::load_config(Some(&config_path))
        .unwrap_or_else(|e| panic!("cannot start with configuration from {config_path}: {e}"));

    init_tracing(&config.logging);
    tracing::info!(
        source = config_source.as_str(),
        path = %config_path,
        "loaded configuration"
    );

    if !config.document.attachment_path.exists() {
        tracing::warn!(
            path = %config.document.attachment_path.display(),
            "attachment file not found; downloads will fail until it exists"
        );
    }

    let addr = SocketAddr::new(config.server.host, config.server.port);
    let listener = TcpListener::bind(addr)
        .await
        .unwrap_or_else(|e| panic!("cannot listen on {addr}: {e}"));

    tracing::info!(%addr, "serving molio documents");

    axum::serve(listener, app(AppState { config }))
        .with_graceful_shutdown(shutdown_requested())
        .await
        .expect("server error");

    tracing::info!("molio server stopped");
}

/// Resolves once the process is asked to stop.
async fn shutdown_requested() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm = match signal(SignalKind::terminate()) {
            Ok(stream) => stream,
            Err(e) => {
                tracing::warn!("SIGTERM handler unavailable, listening for Ctrl+C only: {}", e);
                wait_for_ctrl_c().await;
                return;
            }
        };

        tokio::select! {
            () = wait_for_ctrl_c() => {}
            _ = sigterm.recv() => tracing::info!("received SIGTERM, shutting down"),
        }
    }

    #[cfg(not(unix))]
    {
        wait_for_ctrl_c().await;
    }
}

async fn wait_for_ctrl_c() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("received SIGINT, shutting down"),
        // Without a handler there is nothing to wait for; keep serving.
        Err(e) => {
            tracing::warn!("Ctrl+C handler unavailable: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
