//! Request extractors.
//!
//! The role gates read the [`Identity`] placed in the request extensions by
//! the session middleware. A failed gate redirects with a notice instead of
//! returning an error status.

use aashray_core::{AccessTier, CaseReportInput, Denial, Identity, ImageUpload, check_access};
use axum::{
    Form, Json,
    extract::{FromRequest, FromRequestParts, Multipart, Request},
    http::{StatusCode, header::CONTENT_TYPE, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use std::convert::Infallible;

use crate::flash::{self, Level};

/// Rejection of a role gate: a redirect carrying a notice.
#[derive(Debug)]
pub struct GateRejection {
    denial: Denial,
    jar: CookieJar,
}

impl IntoResponse for GateRejection {
    fn into_response(self) -> Response {
        let level = match self.denial {
            Denial::Unauthenticated => Level::Warning,
            Denial::Forbidden => Level::Error,
        };
        let jar = flash::push(self.jar, level, self.denial.message());
        (jar, Redirect::to(self.denial.redirect_path())).into_response()
    }
}

fn gate(parts: &Parts, tier: AccessTier) -> Result<Identity, GateRejection> {
    let identity = parts.extensions.get::<Identity>();
    match check_access(identity, tier) {
        Ok(identity) => Ok(identity.clone()),
        Err(denial) => {
            if denial == Denial::Forbidden {
                tracing::warn!(path = %parts.uri.path(), ?tier, "Access denied");
            }
            Err(GateRejection {
                denial,
                jar: CookieJar::from_headers(&parts.headers),
            })
        }
    }
}

/// Any authenticated user.
#[derive(Debug, Clone)]
pub struct VolunteerAccess(pub Identity);

impl<S> FromRequestParts<S> for VolunteerAccess
where
    S: Send + Sync,
{
    type Rejection = GateRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        gate(parts, AccessTier::VolunteerOrAbove).map(Self)
    }
}

/// Team members and superusers.
#[derive(Debug, Clone)]
pub struct TeamAccess(pub Identity);

impl<S> FromRequestParts<S> for TeamAccess
where
    S: Send + Sync,
{
    type Rejection = GateRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        gate(parts, AccessTier::TeamOrAbove).map(Self)
    }
}

/// Superusers only.
#[derive(Debug, Clone)]
pub struct AdminAccess(pub Identity);

impl<S> FromRequestParts<S> for AdminAccess
where
    S: Send + Sync,
{
    type Rejection = GateRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        gate(parts, AccessTier::AdminOnly).map(Self)
    }
}

/// Optional identity; never rejects.
#[derive(Debug, Clone)]
pub struct MaybeIdentity(pub Option<Identity>);

impl<S> FromRequestParts<S> for MaybeIdentity
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(parts.extensions.get::<Identity>().cloned()))
    }
}

/// Case report fields read from a multipart, urlencoded or JSON body.
#[derive(Debug, Clone)]
pub struct ReportBody(pub CaseReportInput);

/// A request body that could not be parsed.
#[derive(Debug)]
pub struct UnreadableBody(pub String);

impl IntoResponse for UnreadableBody {
    fn into_response(self) -> Response {
        (StatusCode::BAD_REQUEST, self.0).into_response()
    }
}

async fn read_multipart(mut multipart: Multipart) -> Result<CaseReportInput, UnreadableBody> {
    let mut input = CaseReportInput::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| UnreadableBody(e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "image" => {
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| UnreadableBody(e.body_text()))?;
                input.image = Some(ImageUpload { data });
            }
            "case_type" | "place_spotted" | "needs" | "priority" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| UnreadableBody(e.body_text()))?;
                let slot = match name.as_str() {
                    "case_type" => &mut input.case_type,
                    "place_spotted" => &mut input.place_spotted,
                    "needs" => &mut input.needs,
                    _ => &mut input.priority,
                };
                *slot = Some(value);
            }
            // Owner and status are always set server-side.
            _ => {}
        }
    }

    Ok(input)
}

impl<S> FromRequest<S> for ReportBody
where
    S: Send + Sync,
{
    type Rejection = UnreadableBody;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        let input = if content_type.starts_with("multipart/form-data") {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| UnreadableBody(e.body_text()))?;
            read_multipart(multipart).await?
        } else if content_type.starts_with("application/json") {
            let Json(input) = Json::<CaseReportInput>::from_request(req, state)
                .await
                .map_err(|e| UnreadableBody(e.body_text()))?;
            input
        } else {
            let Form(input) = Form::<CaseReportInput>::from_request(req, state)
                .await
                .map_err(|e| UnreadableBody(e.body_text()))?;
            input
        };

        Ok(Self(input))
    }
}
