//! HTTP request handlers: scrape, liveness probe, not found.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use tracing::error;

use crate::collector::{FileSystem, ProfileCollector};
use crate::exposition;

/// `GET /metrics`: scans the profile directory and renders every series.
///
/// Always 200; scan problems only shrink the result.
pub(crate) async fn handle_metrics<F: FileSystem + 'static>(
    State(collector): State<Arc<ProfileCollector<F>>>,
) -> Response {
    // Directory scans block.
    let series = match tokio::task::spawn_blocking(move || collector.collect()).await {
        Ok(series) => series,
        Err(e) => {
            error!(error = %e, "profile scan task failed");
            Vec::new()
        }
    };

    let body = exposition::render(&series);
    ([(header::CONTENT_TYPE, exposition::CONTENT_TYPE)], body).into_response()
}

/// `GET /probe`: liveness, independent of the profile directory.
pub(crate) async fn handle_probe() -> StatusCode {
    StatusCode::NO_CONTENT
}

pub(crate) async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}
