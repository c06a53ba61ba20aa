//! Scrape server: `/metrics` and `/probe` over HTTP.
//!
//! | Request        | Response                                 |
//! |----------------|------------------------------------------|
//! | `GET /metrics` | 200, text exposition of a fresh scan     |
//! | `GET /probe`   | 204, no body, no scan                    |
//! | anything else  | 404, no body                             |

mod access_log;
mod handlers;

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;
use tracing::info;

use crate::collector::{FileSystem, ProfileCollector};

use access_log::AccessLogLayer;

pub const METRICS_PATH: &str = "/metrics";
pub const PROBE_PATH: &str = "/probe";

/// Builds the router. Each scrape runs its own scan on `collector`.
pub fn router<F: FileSystem + 'static>(collector: Arc<ProfileCollector<F>>) -> Router {
    Router::new()
        .route(
            METRICS_PATH,
            get(handlers::handle_metrics::<F>).fallback(handlers::not_found),
        )
        .route(
            PROBE_PATH,
            get(handlers::handle_probe).fallback(handlers::not_found),
        )
        .fallback(handlers::not_found)
        .with_state(collector)
        .layer(AccessLogLayer)
        .layer(CompressionLayer::new())
}

/// Serves until SIGINT or SIGTERM.
pub async fn serve<F: FileSystem + 'static>(
    listener: TcpListener,
    collector: Arc<ProfileCollector<F>>,
) -> io::Result<()> {
    let app = router(collector).into_make_service_with_connect_info::<SocketAddr>();
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
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
    info!("shutting down");
}
