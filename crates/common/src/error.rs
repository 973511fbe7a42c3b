//! Error types for aashray.

use std::fmt;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

/// Application result type.
pub type AppResult<T> = Result<T, AppError>;

/// What went wrong with a single submitted field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldErrorKind {
    /// The field was absent or blank.
    Missing,
    /// The value exceeds the column width.
    TooLong {
        /// Maximum number of characters.
        max: usize,
    },
    /// The value is not one of the enumerated choices.
    InvalidChoice {
        /// The rejected value.
        value: String,
    },
    /// Any other rule violation.
    Invalid {
        /// Human readable reason.
        message: String,
    },
}

/// A validation failure attached to a named field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Submitted field name.
    pub field: String,
    /// Failure detail.
    #[serde(flatten)]
    pub kind: FieldErrorKind,
}

impl FieldError {
    /// Field was absent or blank.
    pub fn missing(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            kind: FieldErrorKind::Missing,
        }
    }

    /// Value longer than `max` characters.
    pub fn too_long(field: impl Into<String>, max: usize) -> Self {
        Self {
            field: field.into(),
            kind: FieldErrorKind::TooLong { max },
        }
    }

    /// Value outside the enumerated choices.
    pub fn invalid_choice(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            kind: FieldErrorKind::InvalidChoice {
                value: value.into(),
            },
        }
    }

    /// Free-form rule violation.
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            kind: FieldErrorKind::Invalid {
                message: message.into(),
            },
        }
    }

    /// Machine readable code used by the JSON surface.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self.kind {
            FieldErrorKind::Missing => "MISSING_FIELD",
            FieldErrorKind::InvalidChoice { .. } => "INVALID_CHOICE",
            FieldErrorKind::TooLong { .. } | FieldErrorKind::Invalid { .. } => "INVALID_VALUE",
        }
    }

    /// Message shown to the person filling in the form.
    #[must_use]
    pub fn message(&self) -> String {
        match &self.kind {
            FieldErrorKind::Missing => "This field is required.".to_string(),
            FieldErrorKind::TooLong { max } => {
                format!("Ensure this value has at most {max} characters.")
            }
            FieldErrorKind::InvalidChoice { value } => {
                format!("Select a valid choice. {value} is not one of the available choices.")
            }
            FieldErrorKind::Invalid { message } => message.clone(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message())
    }
}

fn join_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Application error type.
#[derive(Debug, Error)]
pub enum AppError {
    // === Client Errors ===
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Case not found: {0}")]
    CaseNotFound(i64),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Invalid fields: {}", join_field_errors(.0))]
    InvalidFields(Vec<FieldError>),

    // === Server Errors ===
    #[error("Database error: {0}")]
    Database(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            // 4xx Client Errors
            Self::NotFound(_) | Self::UserNotFound(_) | Self::CaseNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) | Self::InvalidFields(_) => StatusCode::BAD_REQUEST,

            // 5xx Server Errors
            Self::Database(_) | Self::Storage(_) | Self::Config(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::UserNotFound(_) => "USER_NOT_FOUND",
            Self::CaseNotFound(_) => "CASE_NOT_FOUND",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::InvalidFields(_) => "VALIDATION_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Storage(_) => "STORAGE_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns whether this error should be logged at error level.
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }

    /// Field errors carried by this error, if any.
    #[must_use]
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            Self::InvalidFields(errors) => errors,
            _ => &[],
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code();

        if self.is_server_error() {
            tracing::error!(error = %self, code = code, "Server error occurred");
        } else {
            tracing::debug!(error = %self, code = code, "Client error occurred");
        }

        // Internal detail stays in the log.
        let message = if self.is_server_error() {
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message,
                "fields": self.field_errors(),
            }
        }));

        (status, body).into_response()
    }
}

// === From implementations ===

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        let mut fields: Vec<FieldError> = err
            .field_errors()
            .into_iter()
            .flat_map(|(field, errors)| {
                let field = field.to_string();
                errors.iter().map(move |e| {
                    if e.code == "required" {
                        FieldError::missing(field.clone())
                    } else {
                        let message = e
                            .message
                            .as_ref()
                            .map_or_else(|| e.code.to_string(), ToString::to_string);
                        FieldError::invalid(field.clone(), message)
                    }
                })
            })
            .collect();
        fields.sort_by(|a, b| a.field.cmp(&b.field));
        Self::InvalidFields(fields)
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::CaseNotFound(3).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AppError::InvalidFields(vec![]).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert!(AppError::Database("boom".into()).is_server_error());
        assert!(!AppError::NotFound("x".into()).is_server_error());
    }

    #[test]
    fn test_field_error_codes() {
        assert_eq!(FieldError::missing("needs").code(), "MISSING_FIELD");
        assert_eq!(
            FieldError::invalid_choice("priority", "URGENT").code(),
            "INVALID_CHOICE"
        );
        assert_eq!(FieldError::too_long("case_type", 100).code(), "INVALID_VALUE");
    }

    #[test]
    fn test_field_error_display() {
        let err = FieldError::invalid_choice("priority", "URGENT");
        assert_eq!(
            err.to_string(),
            "priority: Select a valid choice. URGENT is not one of the available choices."
        );
        assert_eq!(
            FieldError::missing("needs").to_string(),
            "needs: This field is required."
        );
    }

    #[test]
    fn test_invalid_fields_display_joins() {
        let err = AppError::InvalidFields(vec![
            FieldError::missing("case_type"),
            FieldError::too_long("place_spotted", 255),
        ]);
        let text = err.to_string();
        assert!(text.contains("case_type: This field is required."));
        assert!(text.contains("place_spotted: Ensure this value has at most 255 characters."));
        assert_eq!(err.field_errors().len(), 2);
    }

    #[tokio::test]
    async fn test_server_error_body_hides_detail() {
        let response = AppError::Database("connection refused".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap_or_default();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap_or_default();
        assert_eq!(body["error"]["code"], "DATABASE_ERROR");
        assert_eq!(body["error"]["message"], "Internal server error");
    }

    #[tokio::test]
    async fn test_client_error_body_lists_fields() {
        let response =
            AppError::InvalidFields(vec![FieldError::missing("needs")]).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap_or_default();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap_or_default();
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(body["error"]["fields"][0]["field"], "needs");
        assert_eq!(body["error"]["fields"][0]["kind"], "missing");
    }
}
