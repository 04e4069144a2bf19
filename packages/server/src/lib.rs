//! Pagespace HTTP Boundary Layer
//!
//! Axum server exposing the page hierarchy core over REST. The boundary
//! translates transport requests into service calls, attaches the
//! authenticated user/workspace context, and maps domain failures to
//! transport-level statuses. All authorization decisions live in the core
//! services.
//!
//! # Architecture
//!
//! Endpoint modules contribute `routes()` routers that are merged into one
//! application router, with request tracing and the authentication layer
//! applied on top.

use axum::{middleware, Router};
use pagespace_core::services::{PageHistoryService, PageService};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod auth;
mod http_error;
mod page_endpoints;

pub use auth::{AuthUser, AuthWorkspace};
pub use http_error::HttpError;

/// Application state shared across all endpoints
#[derive(Clone)]
pub struct AppState {
    pub page_service: Arc<PageService>,
    pub history_service: Arc<PageHistoryService>,
}

/// Create the application router with all endpoint modules.
///
/// The authentication layer is the header-trusting development variant;
/// production deployments front the router with their own session
/// verification middleware instead.
pub fn create_router(state: AppState) -> Router {
    page_endpoints::routes()
        .layer(middleware::from_fn(auth::require_auth))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Get the server port from the environment or the default
///
/// Reads `PAGESPACE_PORT`, falling back to 3000 if unset or unparsable.
pub fn default_server_port() -> u16 {
    std::env::var("PAGESPACE_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3000)
}
