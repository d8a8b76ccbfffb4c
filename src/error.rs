//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used throughout the application.
//! Every failure a request can hit falls in one of four buckets: validation errors the
//! user can correct, authorization errors that require a fresh login, not-found errors
//! (which also cover resources owned by somebody else) and unclassified server errors.
//!
//! `AppError` implements `actix_web::error::ResponseError` so handlers can simply return
//! `Result<_, AppError>`. `From` implementations for `sqlx::Error`,
//! `validator::ValidationErrors`, `jsonwebtoken::errors::Error` and `bcrypt::BcryptError`
//! allow easy conversion using the `?` operator.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;
use thiserror::Error;
use validator::{ValidationErrors, ValidationErrorsKind};

/// Represents all possible errors that can occur within the application.
#[derive(Debug, Error)]
pub enum AppError {
    /// Authentication failed or is missing (HTTP 401).
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    /// The presented credential is understood but rejected (HTTP 403).
    /// Used for refresh tokens that are expired, tampered with or of the wrong kind.
    #[error("Forbidden: {0}")]
    Forbidden(String),
    /// Malformed or otherwise unacceptable request (HTTP 400).
    #[error("Bad Request: {0}")]
    BadRequest(String),
    /// Requested resource does not exist or is not owned by the caller (HTTP 404).
    #[error("Not Found: {0}")]
    NotFound(String),
    /// Unexpected server-side error (HTTP 500).
    #[error("Internal Server Error: {0}")]
    InternalServerError(String),
    /// Error originating from database operations (HTTP 500).
    #[error("Database Error: {0}")]
    DatabaseError(String),
    /// One or more field rules failed (HTTP 400).
    /// Carries every human-readable message, in field order.
    #[error("Validation Error: {}", .0.join(" "))]
    ValidationError(Vec<String>),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::BadRequest(_) | AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InternalServerError(_) | AppError::DatabaseError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());
        match self {
            AppError::ValidationError(messages) => builder.json(json!({ "errors": messages })),
            AppError::InternalServerError(msg) | AppError::DatabaseError(msg) => {
                // Details stay in the log, the client gets a generic message.
                log::error!("{}", msg);
                builder.json(json!({ "error": "Internal server error" }))
            }
            AppError::Unauthorized(msg)
            | AppError::Forbidden(msg)
            | AppError::BadRequest(msg)
            | AppError::NotFound(msg) => builder.json(json!({ "error": msg })),
        }
    }
}

/// Flattens `ValidationErrors` into display messages.
///
/// `field_order` fixes the order in which fields are reported; fields not listed
/// follow in alphabetical order. Within a field, messages keep the order in which
/// the rules are declared.
pub fn validation_messages(errors: &ValidationErrors, field_order: &[&str]) -> Vec<String> {
    let by_field = errors.errors();
    let mut fields: Vec<&str> = field_order
        .iter()
        .copied()
        .filter(|field| by_field.contains_key(*field))
        .collect();
    let mut rest: Vec<&str> = by_field
        .keys()
        .copied()
        .filter(|field| !field_order.contains(field))
        .collect();
    rest.sort_unstable();
    fields.extend(rest);

    let mut messages = Vec::new();
    for field in fields {
        if let Some(ValidationErrorsKind::Field(field_errors)) = by_field.get(field) {
            for error in field_errors {
                let message = match &error.message {
                    Some(message) => message.to_string(),
                    None => format!("{}: {}", field, error.code),
                };
                if !messages.contains(&message) {
                    messages.push(message);
                }
            }
        }
    }
    messages
}

/// Converts `sqlx::Error` into `AppError`.
///
/// `RowNotFound` becomes `NotFound`, a unique violation becomes `BadRequest`
/// and everything else is a `DatabaseError`.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match error {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".into()),
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::BadRequest("Email already exists".into())
            }
            _ => AppError::DatabaseError(error.to_string()),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::ValidationError(validation_messages(&error, &[]))
    }
}

/// Converts `jsonwebtoken::errors::Error` into `AppError::Unauthorized`.
impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(error: jsonwebtoken::errors::Error) -> AppError {
        AppError::Unauthorized(error.to_string())
    }
}

/// Converts `bcrypt::BcryptError` into `AppError::InternalServerError`.
impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::InternalServerError(error.to_string())
    }
}
