//! JSON case report endpoint.

use aashray_core::PriorityDefault;
use axum::{
    Router,
    extract::State,
    response::{IntoResponse, Response},
    routing::post,
};

use crate::{
    extractors::{MaybeIdentity, ReportBody, UnreadableBody},
    middleware::AppState,
    response::{ApiFailure, ReportCreated},
};

pub fn router() -> Router<AppState> {
    Router::new().route("/api/report/", post(report))
}

/// `POST /api/report/`
///
/// Priority defaults to MEDIUM; the owner is always the caller.
async fn report(
    State(state): State<AppState>,
    MaybeIdentity(identity): MaybeIdentity,
    body: Result<ReportBody, UnreadableBody>,
) -> Response {
    let Some(identity) = identity else {
        return ApiFailure::unauthenticated().into_response();
    };

    let input = match body {
        Ok(ReportBody(input)) => input,
        Err(UnreadableBody(message)) => return ApiFailure::unreadable(message).into_response(),
    };

    match state
        .case_service
        .report(identity.user_id(), input, PriorityDefault::Medium)
        .await
    {
        Ok(case) => ReportCreated::new(case.id).into_response(),
        Err(e) => ApiFailure::from(e).into_response(),
    }
}
