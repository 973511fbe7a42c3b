//! Response types for the JSON endpoint and HTML error pages.

use aashray_common::AppError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::views;

/// Body of a successful case report.
#[derive(Debug, Serialize)]
pub struct ReportCreated {
    pub success: bool,
    pub message: &'static str,
    pub case_id: i64,
}

impl ReportCreated {
    #[must_use]
    pub const fn new(case_id: i64) -> Self {
        Self {
            success: true,
            message: "Case reported successfully",
            case_id,
        }
    }
}

impl IntoResponse for ReportCreated {
    fn into_response(self) -> Response {
        (StatusCode::CREATED, Json(self)).into_response()
    }
}

/// JSON failure body: `{"success": false, "error": ..., "code": ..., "field": ...}`.
#[derive(Debug, Serialize)]
pub struct ApiFailure {
    #[serde(skip)]
    status: StatusCode,
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ApiFailure {
    /// 401 for callers without a session.
    #[must_use]
    pub fn unauthenticated() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            success: false,
            error: "Authentication required".to_string(),
            code: None,
            field: None,
        }
    }

    /// 400 for a body that could not be read at all.
    pub fn unreadable(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            success: false,
            error: message.into(),
            code: Some("INVALID_VALUE"),
            field: None,
        }
    }
}

impl From<AppError> for ApiFailure {
    fn from(err: AppError) -> Self {
        if let Some(first) = err.field_errors().first() {
            return Self {
                status: StatusCode::BAD_REQUEST,
                success: false,
                error: first.message(),
                code: Some(first.code()),
                field: Some(first.field.clone()),
            };
        }

        if err.is_server_error() {
            tracing::error!(error = %err, "Failed to store reported case");
            return Self {
                status: StatusCode::BAD_REQUEST,
                success: false,
                error: "Could not save the case".to_string(),
                code: Some("PERSISTENCE_ERROR"),
                field: None,
            };
        }

        Self::unreadable(err.to_string())
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

/// Error rendered as an HTML page.
#[derive(Debug)]
pub struct HtmlError(pub AppError);

impl From<AppError> for HtmlError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl IntoResponse for HtmlError {
    fn into_response(self) -> Response {
        let status = self.0.status_code();
        if self.0.is_server_error() {
            tracing::error!(error = %self.0, code = self.0.error_code(), "Server error occurred");
        } else {
            tracing::debug!(error = %self.0, code = self.0.error_code(), "Client error occurred");
        }

        let page = if status == StatusCode::NOT_FOUND {
            views::not_found_page()
        } else if self.0.is_server_error() {
            views::error_page(status, "Something went wrong. Please try again later.")
        } else {
            views::error_page(status, &self.0.to_string())
        };
        (status, page).into_response()
    }
}

/// HTML handler result type.
pub type HtmlResult<T> = Result<T, HtmlError>;

#[cfg(test)]
mod tests {
    use super::*;
    use aashray_common::FieldError;

    #[test]
    fn test_failure_from_field_errors_uses_first() {
        let failure = ApiFailure::from(AppError::InvalidFields(vec![
            FieldError::missing("case_type"),
            FieldError::invalid_choice("priority", "URGENT"),
        ]));
        assert_eq!(failure.status, StatusCode::BAD_REQUEST);
        assert_eq!(failure.code, Some("MISSING_FIELD"));
        assert_eq!(failure.field.as_deref(), Some("case_type"));
        assert_eq!(failure.error, "This field is required.");
    }

    #[test]
    fn test_persistence_failure_hides_detail() {
        let failure = ApiFailure::from(AppError::Database("relation \"case\" missing".into()));
        assert_eq!(failure.code, Some("PERSISTENCE_ERROR"));
        assert!(!failure.error.contains("relation"));
    }

    #[test]
    fn test_unauthenticated_body() {
        let failure = ApiFailure::unauthenticated();
        let body = serde_json::to_value(&failure).unwrap_or_default();
        assert_eq!(
            body,
            serde_json::json!({"success": false, "error": "Authentication required"})
        );
    }
}
