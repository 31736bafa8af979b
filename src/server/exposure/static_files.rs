//! Static page endpoint
//!
//! `GET /` and `GET /index.html` return the configured page, read from disk
//! on every request so it can be edited while the relay runs. Everything
//! else is a plain-text 404.

use crate::config::RelayConfig;
use crate::core::error::RelayError;
use axum::http::{Method, StatusCode, header};
use axum::response::{IntoResponse, Response};

/// Paths that resolve to the static page
pub const INDEX_PATHS: [&str; 2] = ["/", "/index.html"];

/// Answer a plain HTTP request
pub async fn serve(config: &RelayConfig, method: &Method, path: &str) -> Response {
    let is_read = *method == Method::GET || *method == Method::HEAD;
    if !is_read || !INDEX_PATHS.contains(&path) {
        return (StatusCode::NOT_FOUND, "Not found").into_response();
    }

    match read_index(config).await {
        Ok(body) => (
            [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read static page");
            e.into_response()
        }
    }
}

async fn read_index(config: &RelayConfig) -> Result<Vec<u8>, RelayError> {
    let path = config.index_path();
    tokio::fs::read(&path)
        .await
        .map_err(|source| RelayError::Asset { path, source })
}
