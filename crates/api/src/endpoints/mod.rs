//! HTTP endpoints.

mod api;
mod auth;
mod cases;
mod dashboard;
mod team;
mod volunteer;

use aashray_common::AppError;
use axum::{Router, http::StatusCode, response::IntoResponse};

use crate::{
    middleware::AppState,
    response::{HtmlError, HtmlResult},
    views,
};

/// Create the application router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(volunteer::router())
        .merge(cases::router())
        .merge(team::router())
        .merge(dashboard::router())
        .merge(api::router())
        .fallback(not_found)
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, views::not_found_page())
}

/// Parse an integer path segment; anything else is a 404 like an unknown row.
fn parse_id(raw: &str) -> HtmlResult<i64> {
    raw.parse()
        .map_err(|_| HtmlError(AppError::NotFound(format!("No object with id {raw}"))))
}
