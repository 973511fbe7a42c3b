//! Team dashboard and status updates.

use aashray_common::AppError;
use axum::{
    Form, Router,
    extract::{Path, State, rejection::FormRejection},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;

use super::parse_id;
use crate::{
    extractors::TeamAccess,
    flash::{self, Level},
    middleware::AppState,
    response::HtmlResult,
    views,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/team/dashboard/", get(dashboard))
        .route("/team/case/{id}/update/", post(update_status))
}

/// Status update form.
#[derive(Debug, Default, Deserialize)]
pub struct StatusForm {
    #[serde(default)]
    pub status: String,
}

async fn dashboard(
    State(state): State<AppState>,
    TeamAccess(identity): TeamAccess,
    jar: CookieJar,
) -> HtmlResult<Response> {
    let board = state.case_service.team_board().await?;

    let (jar, notices) = flash::take(jar);
    let image_url = |key: &str| state.case_service.image_url(key);
    let page = views::team_dashboard_page(&identity, &notices, &board, &image_url);
    Ok((jar, page).into_response())
}

async fn update_status(
    State(state): State<AppState>,
    TeamAccess(identity): TeamAccess,
    Path(id): Path<String>,
    jar: CookieJar,
    form: Result<Form<StatusForm>, FormRejection>,
) -> HtmlResult<Response> {
    let case_id = parse_id(&id)?;
    let status = form.map(|Form(f)| f.status).unwrap_or_default();

    let jar = match state.case_service.update_status(case_id, &status).await {
        Ok(case) => {
            tracing::debug!(case_id, by = identity.user_id(), "Status changed from dashboard");
            flash::push(
                jar,
                Level::Success,
                format!("Case status updated to {}.", case.status.label()),
            )
        }
        Err(AppError::InvalidFields(errors)) => {
            let message = errors
                .first()
                .map_or_else(|| "Invalid status.".to_string(), |e| e.message());
            flash::push(jar, Level::Error, message)
        }
        Err(e) => return Err(e.into()),
    };

    Ok((jar, Redirect::to("/team/dashboard/")).into_response())
}
