//! Login, registration and logout.

use aashray_common::AppError;
use aashray_core::RegistrationInput;
use axum::{
    Form, Router,
    extract::State,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;

use crate::{
    extractors::MaybeIdentity,
    flash::{self, Level, Notice},
    middleware::AppState,
    response::HtmlResult,
    views,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(login_form).post(login))
        .route("/login/", get(login_form).post(login))
        .route("/register/", get(register_form).post(register))
        .route("/logout/", post(logout))
}

/// Login form fields.
#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

async fn login_form(MaybeIdentity(identity): MaybeIdentity, jar: CookieJar) -> Response {
    if let Some(identity) = identity {
        return Redirect::to(identity.role().home_path()).into_response();
    }

    let (jar, notices) = flash::take(jar);
    (jar, views::login_page(&notices, "")).into_response()
}

async fn login(
    State(state): State<AppState>,
    MaybeIdentity(identity): MaybeIdentity,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> HtmlResult<Response> {
    if let Some(identity) = identity {
        return Ok(Redirect::to(identity.role().home_path()).into_response());
    }

    let user = match state
        .account_service
        .authenticate(&form.username, &form.password)
        .await
    {
        Ok(user) => user,
        Err(AppError::Unauthorized) => {
            let (jar, mut notices) = flash::take(jar);
            notices.push(Notice::error("Invalid username or password."));
            return Ok((jar, views::login_page(&notices, &form.username)).into_response());
        }
        Err(e) => return Err(e.into()),
    };

    let session = state.session_service.start(user.id).await?;
    state.account_service.record_login(user.id).await?;

    let greeting = format!("Welcome back, {}!", user.display_name());
    let identity = state.session_service.identity_for(user).await?;
    tracing::info!(user_id = identity.user_id(), role = identity.role().label(), "User logged in");

    let jar = jar.add(state.session_cookie(session.token));
    let jar = flash::push(jar, Level::Success, greeting);
    Ok((jar, Redirect::to(identity.role().home_path())).into_response())
}

async fn register_form(MaybeIdentity(identity): MaybeIdentity, jar: CookieJar) -> Response {
    if let Some(identity) = identity {
        return Redirect::to(identity.role().home_path()).into_response();
    }

    let (jar, notices) = flash::take(jar);
    (
        jar,
        views::register_page(&notices, &RegistrationInput::default(), &[]),
    )
        .into_response()
}

async fn register(
    State(state): State<AppState>,
    MaybeIdentity(identity): MaybeIdentity,
    jar: CookieJar,
    Form(input): Form<RegistrationInput>,
) -> HtmlResult<Response> {
    if let Some(identity) = identity {
        return Ok(Redirect::to(identity.role().home_path()).into_response());
    }

    let user = match state.account_service.register(input.clone()).await {
        Ok(user) => user,
        Err(AppError::InvalidFields(errors)) => {
            let (jar, mut notices) = flash::take(jar);
            notices.extend(errors.iter().map(|e| Notice::error(e.to_string())));
            let page = views::register_page(&notices, &input.normalized(), &errors);
            return Ok((jar, page).into_response());
        }
        Err(e) => return Err(e.into()),
    };

    let session = state.session_service.start(user.id).await?;
    state.account_service.record_login(user.id).await?;

    let jar = jar.add(state.session_cookie(session.token));
    let jar = flash::push(
        jar,
        Level::Success,
        "Registration successful! Welcome to Aashray.",
    );
    Ok((jar, Redirect::to("/volunteer/home/")).into_response())
}

async fn logout(State(state): State<AppState>, jar: CookieJar) -> HtmlResult<Response> {
    let token = jar
        .get(&state.session.cookie_name)
        .map(|c| c.value().to_string());
    if let Some(token) = token {
        state.session_service.end(&token).await?;
    }

    let jar = jar.remove(state.expired_session_cookie());
    let jar = flash::push(jar, Level::Info, "You have been logged out successfully.");
    Ok((jar, Redirect::to("/login/")).into_response())
}
