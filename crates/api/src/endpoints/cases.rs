//! Case board.

use aashray_core::BoardQuery;
use axum::{
    Router,
    extract::{Query, State},
    response::{IntoResponse, Response},
    routing::get,
};
use axum_extra::extract::cookie::CookieJar;

use crate::{
    extractors::VolunteerAccess, flash, middleware::AppState, response::HtmlResult, views,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/cases/", get(board))
}

async fn board(
    State(state): State<AppState>,
    VolunteerAccess(identity): VolunteerAccess,
    jar: CookieJar,
    Query(query): Query<BoardQuery>,
) -> HtmlResult<Response> {
    let cases = state.case_service.board(&query).await?;

    let (jar, notices) = flash::take(jar);
    let image_url = |key: &str| state.case_service.image_url(key);
    let page = views::case_board_page(&identity, &notices, &cases, &query, &image_url);
    Ok((jar, page).into_response())
}
