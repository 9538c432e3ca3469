//! Shared error handling utilities.

use axum::{http::StatusCode, Json};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use serde::Serialize;
use tracing::error;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct ApiError {
    #[schema(example = "Invalid credentials")]
    pub error: String,
    #[schema(example = "INVALID_CREDENTIALS")]
    pub code: String,
}

impl ApiError {
    pub fn new(error: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
        }
    }

    pub fn bad_request(
        error: impl Into<String>,
        code: impl Into<String>,
    ) -> (StatusCode, Json<Self>) {
        (StatusCode::BAD_REQUEST, Json(Self::new(error, code)))
    }
}

pub type ApiResult<T> = Result<T, (StatusCode, Json<ApiError>)>;

/// Failures surfaced by the persistence, policy and service layers.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{message}")]
    Conflict { message: String, code: &'static str },

    #[error("user already exists")]
    UserExists,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("database error: {0}")]
    Database(#[from] DieselError),

    #[error("database connection error: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),

    #[error("password hashing failed: {0}")]
    PasswordHash(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn validation(message: impl Into<String>) -> Self {
        ServiceError::Validation(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ServiceError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ServiceError::NotFound(message.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ServiceError::Forbidden(_) => StatusCode::FORBIDDEN,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Conflict { .. } | ServiceError::UserExists => StatusCode::CONFLICT,
            ServiceError::Database(_)
            | ServiceError::Pool(_)
            | ServiceError::PasswordHash(_)
            | ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::Validation(_) => "VALIDATION_ERROR",
            ServiceError::Forbidden(_) => "FORBIDDEN",
            ServiceError::NotFound(_) => "NOT_FOUND",
            ServiceError::Conflict { code, .. } => *code,
            ServiceError::UserExists => "USER_EXISTS",
            ServiceError::InvalidCredentials => "INVALID_CREDENTIALS",
            ServiceError::Database(_) => "DB_ERROR",
            ServiceError::Pool(_) => "DB_CONNECTION_ERROR",
            ServiceError::PasswordHash(_) => "PASSWORD_HASH_ERROR",
            ServiceError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Message safe to return to the caller. Infrastructure detail stays in the logs.
    pub fn public_message(&self) -> String {
        match self {
            ServiceError::Database(_) => "Database error".to_string(),
            ServiceError::Pool(_) => "Database connection error".to_string(),
            ServiceError::PasswordHash(_) => "Failed to process password".to_string(),
            ServiceError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

/// True when the error is a foreign key violation, e.g. an unknown event or user id.
pub fn is_foreign_key_violation(err: &DieselError) -> bool {
    matches!(
        err,
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _)
    )
}

pub fn is_unique_violation(err: &DieselError) -> bool {
    matches!(
        err,
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)
    )
}

impl From<ServiceError> for (StatusCode, Json<ApiError>) {
    fn from(err: ServiceError) -> Self {
        let status = err.status_code();
        if status.is_server_error() {
            error!(error = %err, code = err.code(), "Request failed");
        }
        (status, Json(ApiError::new(err.public_message(), err.code())))
    }
}
