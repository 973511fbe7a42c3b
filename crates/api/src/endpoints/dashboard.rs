//! Admin dashboard and Team role management.

use aashray_core::{AppointOutcome, RemoveOutcome};
use axum::{
    Router,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use axum_extra::extract::cookie::CookieJar;

use super::parse_id;
use crate::{
    extractors::AdminAccess,
    flash::{self, Level},
    middleware::AppState,
    response::HtmlResult,
    views,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/dashboard/", get(dashboard))
        .route("/dashboard/appoint/{user_id}/", post(appoint))
        .route("/dashboard/remove/{user_id}/", post(remove))
}

async fn dashboard(
    State(state): State<AppState>,
    AdminAccess(identity): AdminAccess,
    jar: CookieJar,
) -> HtmlResult<Response> {
    let overview = state.team_service.overview().await?;

    let (jar, notices) = flash::take(jar);
    let image_url = |key: &str| state.case_service.image_url(key);
    let page = views::admin_dashboard_page(&identity, &notices, &overview, &image_url);
    Ok((jar, page).into_response())
}

async fn appoint(
    State(state): State<AppState>,
    AdminAccess(_): AdminAccess,
    Path(user_id): Path<String>,
    jar: CookieJar,
) -> HtmlResult<Response> {
    let user_id = parse_id(&user_id)?;

    let jar = match state.team_service.appoint(user_id).await? {
        AppointOutcome::Appointed(user) => flash::push(
            jar,
            Level::Success,
            format!("{} has been appointed as a Team member.", user.username),
        ),
        AppointOutcome::AlreadyMember(user) => flash::push(
            jar,
            Level::Info,
            format!("{} is already a Team member.", user.username),
        ),
    };

    Ok((jar, Redirect::to("/dashboard/")).into_response())
}

async fn remove(
    State(state): State<AppState>,
    AdminAccess(_): AdminAccess,
    Path(user_id): Path<String>,
    jar: CookieJar,
) -> HtmlResult<Response> {
    let user_id = parse_id(&user_id)?;

    let jar = match state.team_service.remove(user_id).await? {
        RemoveOutcome::Removed(user) => flash::push(
            jar,
            Level::Success,
            format!("{} has been removed from Team.", user.username),
        ),
        RemoveOutcome::NotMember(_) => jar,
    };

    Ok((jar, Redirect::to("/dashboard/")).into_response())
}
