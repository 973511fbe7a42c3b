//! Volunteer home and case reporting.

use aashray_common::AppError;
use aashray_core::{CaseReportInput, PriorityDefault};
use axum::{
    Router,
    extract::State,
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use axum_extra::extract::cookie::CookieJar;

use crate::{
    extractors::{ReportBody, UnreadableBody, VolunteerAccess},
    flash::{self, Level, Notice},
    middleware::AppState,
    response::{HtmlError, HtmlResult},
    views,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/volunteer/home/", get(home))
        .route("/volunteer/report/", get(report_form).post(report))
}

async fn home(
    State(state): State<AppState>,
    VolunteerAccess(identity): VolunteerAccess,
    jar: CookieJar,
) -> HtmlResult<Response> {
    let summary = state
        .case_service
        .volunteer_summary(identity.user_id())
        .await?;

    let (jar, notices) = flash::take(jar);
    let image_url = |key: &str| state.case_service.image_url(key);
    let page = views::volunteer_home_page(&identity, &notices, &summary, &image_url);
    Ok((jar, page).into_response())
}

async fn report_form(VolunteerAccess(identity): VolunteerAccess, jar: CookieJar) -> Response {
    let (jar, notices) = flash::take(jar);
    let page = views::report_page(&identity, &notices, &CaseReportInput::default(), &[]);
    (jar, page).into_response()
}

async fn report(
    State(state): State<AppState>,
    VolunteerAccess(identity): VolunteerAccess,
    jar: CookieJar,
    body: Result<ReportBody, UnreadableBody>,
) -> HtmlResult<Response> {
    let input = match body {
        Ok(ReportBody(input)) => input,
        Err(UnreadableBody(message)) => return Err(HtmlError(AppError::BadRequest(message))),
    };

    match state
        .case_service
        .report(identity.user_id(), input.clone(), PriorityDefault::Required)
        .await
    {
        Ok(_) => {
            let jar = flash::push(
                jar,
                Level::Success,
                "Case reported successfully! Thank you for your contribution.",
            );
            Ok((jar, Redirect::to("/volunteer/home/")).into_response())
        }
        Err(AppError::InvalidFields(errors)) => {
            let (jar, mut notices) = flash::take(jar);
            notices.push(Notice::error("Please correct the errors below."));
            let page = views::report_page(&identity, &notices, &input, &errors);
            Ok((jar, page).into_response())
        }
        Err(e) => Err(e.into()),
    }
}
