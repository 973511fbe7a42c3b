//! HTTP layer for aashray.
//!
//! This crate provides the web surface:
//!
//! - **Endpoints**: HTML pages for each role and the JSON report API
//! - **Extractors**: Role gates that redirect with a notice
//! - **Middleware**: Session cookie resolution
//! - **Flash**: One-shot notices carried in a cookie
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod flash;
pub mod middleware;
pub mod response;
pub mod views;

use axum::{Router, extract::DefaultBodyLimit};

pub use endpoints::router;
use middleware::AppState;

/// Build the full application router with session resolution and body limits.
pub fn app(state: AppState) -> Router {
    let body_limit = state.max_upload_bytes;
    router()
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::session_middleware,
        ))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
