//! Application state and session middleware.

#![allow(missing_docs)]

use aashray_common::{AppError, config::SessionConfig};
use aashray_core::{AccountService, CaseService, SessionService, TeamService};
use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub account_service: AccountService,
    pub session_service: SessionService,
    pub case_service: CaseService,
    pub team_service: TeamService,
    pub session: SessionConfig,
    pub max_upload_bytes: usize,
}

impl AppState {
    /// Cookie carrying a freshly issued session token.
    #[must_use]
    pub fn session_cookie(&self, token: String) -> Cookie<'static> {
        Cookie::build((self.session.cookie_name.clone(), token))
            .path("/")
            .http_only(true)
            .secure(self.session.secure)
            .same_site(SameSite::Lax)
            .build()
    }

    /// Cookie that clears the session token.
    #[must_use]
    pub fn expired_session_cookie(&self) -> Cookie<'static> {
        Cookie::build(self.session.cookie_name.clone())
            .path("/")
            .build()
    }
}

/// Session middleware.
///
/// Resolves the session cookie into an [`aashray_core::Identity`] stored in
/// the request extensions. Requests without a valid session pass through
/// unauthenticated. A failed lookup fails the request with a 500.
pub async fn session_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    if let Some(cookie) = jar.get(&state.session.cookie_name) {
        match state.session_service.resolve(cookie.value()).await? {
            Some(identity) => {
                req.extensions_mut().insert(identity);
            }
            None => {
                tracing::debug!("Ignoring unknown or expired session");
            }
        }
    }

    Ok(next.run(req).await)
}
