//! HTTP and WebSocket exposure
//!
//! Both surfaces share one port. A request carrying a WebSocket upgrade is
//! handed to the gateway whatever its path; any other request goes to the
//! static page endpoint.

pub mod static_files;
pub mod websocket;

pub use websocket::{Gateway, PeerReceiver};

use super::host::RelayHost;
use axum::Router;
use axum::extract::State;
use axum::extract::ws::WebSocketUpgrade;
use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::http::{Method, Uri};
use axum::response::Response;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Relay exposure implementation
///
/// Consumes a `RelayHost` and produces the Axum router serving both the
/// static page and the WebSocket endpoint.
pub struct RelayExposure;

impl RelayExposure {
    /// Build the router from a host
    pub fn build_router(host: Arc<RelayHost>) -> Router {
        Router::new()
            .fallback(entry)
            .with_state(host)
            .layer(TraceLayer::new_for_http())
    }
}

/// Single entry point: upgrade if asked to, otherwise serve the page
async fn entry(
    upgrade: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
    State(host): State<Arc<RelayHost>>,
    method: Method,
    uri: Uri,
) -> Response {
    match upgrade {
        Ok(ws) => websocket::upgrade(ws, host),
        Err(_) => static_files::serve(&host.config, &method, uri.path()).await,
    }
}
