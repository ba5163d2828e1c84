//! API error handling
//!
//! Author: hephaex@gmail.com

use crate::auth::{AuthError, SessionError};
use crate::upload::UploadError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use quill_core::StoreError;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::ValidationErrors;

/// API error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// Error code
    pub code: String,
    /// Human-readable message
    pub message: String,
    /// Additional details (field errors for validation failures)
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<serde_json::Value>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn not_found(resource: &str) -> Self {
        Self::new("NOT_FOUND", format!("{resource} not found"))
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("BAD_REQUEST", message)
    }

    pub fn unauthorized() -> Self {
        Self::new("UNAUTHORIZED", "Authentication required")
    }

    pub fn forbidden() -> Self {
        Self::new("FORBIDDEN", "Access denied")
    }

    pub fn internal_error() -> Self {
        Self::new("INTERNAL_ERROR", "Internal server error")
    }
}

/// Field-level validation failure
#[derive(Debug, Serialize)]
struct FieldError {
    field: String,
    message: String,
}

fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut fields: Vec<FieldError> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, issues)| {
            issues.iter().map(move |issue| FieldError {
                field: field.to_string(),
                message: issue
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{field} is invalid ({})", issue.code)),
            })
        })
        .collect();
    fields.sort_by(|a, b| a.field.cmp(&b.field));
    fields
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    BadRequest(String),
    Validation(ValidationErrors),
    Unauthorized,
    Forbidden(String),
    Upstream(String),
    Internal(String),
    Database(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ApiError::not_found(&msg)),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ApiError::bad_request(msg)),
            AppError::Validation(errors) => {
                let details = serde_json::to_value(field_errors(&errors))
                    .unwrap_or(serde_json::Value::Null);
                (
                    StatusCode::BAD_REQUEST,
                    ApiError::bad_request("Validation failed").with_details(details),
                )
            }
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, ApiError::unauthorized()),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, ApiError::new("FORBIDDEN", msg)),
            AppError::Upstream(msg) => {
                tracing::error!(error = %msg, "upstream request failed");
                (
                    StatusCode::BAD_GATEWAY,
                    ApiError::new("UPSTREAM_ERROR", "Upstream request failed").with_details(msg),
                )
            }
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiError::internal_error(),
                )
            }
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiError::new("DATABASE_ERROR", "Database operation failed"),
                )
            }
        };

        (status, Json(error)).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        AppError::Validation(errors)
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(what) => AppError::BadRequest(format!("{what} already exists")),
            StoreError::Database(msg) | StoreError::Migration(msg) => AppError::Database(msg),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(_: AuthError) -> Self {
        AppError::Unauthorized
    }
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Invalid(msg) => AppError::BadRequest(msg),
            SessionError::Auth(e) => e.into(),
            SessionError::Forbidden => {
                AppError::Forbidden("Cannot log out a different account".to_string())
            }
            SessionError::Store(e) => e.into(),
            SessionError::Password(e) => AppError::Internal(e.to_string()),
            SessionError::Token(e) => AppError::Internal(e.to_string()),
        }
    }
}

impl From<UploadError> for AppError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::Invalid(msg) => AppError::BadRequest(msg),
            UploadError::Upstream(msg) => AppError::Upstream(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Input {
        #[validate(length(min = 1, message = "name must not be empty"))]
        name: String,
        #[validate(range(min = 1))]
        page: u32,
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_validation_errors_carry_field_details() {
        let errors = Input {
            name: String::new(),
            page: 0,
        }
        .validate()
        .unwrap_err();

        let response = AppError::from(errors).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = body_json(response).await;
        assert_eq!(json["code"], "BAD_REQUEST");
        let details = json["details"].as_array().unwrap();
        assert_eq!(details.len(), 2);
        assert_eq!(details[0]["field"], "name");
        assert_eq!(details[0]["message"], "name must not be empty");
        assert_eq!(details[1]["field"], "page");
    }

    #[tokio::test]
    async fn test_store_errors_map_to_status() {
        let duplicate = AppError::from(StoreError::Duplicate("domain url".to_string()));
        assert_eq!(duplicate.into_response().status(), StatusCode::BAD_REQUEST);

        let db = AppError::from(StoreError::Database("boom".to_string())).into_response();
        assert_eq!(db.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(db).await;
        assert_eq!(json["code"], "DATABASE_ERROR");
    }

    #[tokio::test]
    async fn test_auth_failures_are_indistinguishable() {
        let a = AppError::from(AuthError::InvalidCredentials).into_response();
        let b = AppError::from(AuthError::MissingToken).into_response();
        assert_eq!(a.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(a).await, body_json(b).await);
    }

    #[test]
    fn test_upstream_maps_to_bad_gateway() {
        let response = AppError::from(UploadError::Upstream("timeout".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
