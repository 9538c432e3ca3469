//! Signup and login handlers.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::warn;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::{ApiError, ApiResult},
    helpers::JsonBody,
    models::User,
    AppState,
};

/// Placeholder returned by `/login`; no token is issued or checked.
pub const PLACEHOLDER_TOKEN: &str = "mock-jwt-token";

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SignupRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    #[schema(example = "Ann")]
    pub name: String,
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "ann@example.com")]
    pub email: String,
    #[schema(example = "secret1", min_length = 6)]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "ann@example.com")]
    pub email: String,
    #[schema(example = "secret1")]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserSummary {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "Ann")]
    pub name: String,
    #[schema(example = "ann@example.com")]
    pub email: String,
}

impl From<User> for UserSummary {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SignupResponse {
    #[schema(example = "User created successfully")]
    pub message: String,
    pub user: UserSummary,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    #[schema(example = "mock-jwt-token")]
    pub token: String,
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "Ann")]
    pub name: String,
    #[schema(example = "ann@example.com")]
    pub email: String,
}

fn validation_failure(e: validator::ValidationErrors) -> (axum::http::StatusCode, Json<ApiError>) {
    ApiError::bad_request(format!("Validation error: {}", e), "VALIDATION_ERROR")
}

#[utoipa::path(
    post,
    path = "/signup",
    tag = "Authentication",
    request_body = SignupRequest,
    responses(
        (status = 200, description = "User created", body = SignupResponse),
        (status = 400, description = "Validation error", body = ApiError),
        (status = 409, description = "User already exists", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    )
)]
pub async fn signup(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<SignupRequest>,
) -> ApiResult<Json<SignupResponse>> {
    payload.validate().map_err(validation_failure)?;

    let user = state
        .users
        .signup(&payload.name, &payload.email, &payload.password)
        .await?;

    Ok(Json(SignupResponse {
        message: "User created successfully".to_string(),
        user: user.into(),
    }))
}

#[utoipa::path(
    post,
    path = "/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Validation error", body = ApiError),
        (status = 401, description = "Invalid credentials", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    if let Err(e) = payload.validate() {
        warn!(error = %e, "Malformed login request");
        return Err(validation_failure(e));
    }

    let user = state.users.login(&payload.email, &payload.password).await?;

    Ok(Json(LoginResponse {
        token: PLACEHOLDER_TOKEN.to_string(),
        id: user.id,
        name: user.name,
        email: user.email,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signup_request_validation() {
        let ok = SignupRequest {
            name: "Ann".to_string(),
            email: "ann@x.com".to_string(),
            password: "secret1".to_string(),
        };
        assert!(ok.validate().is_ok());

        let bad_email = SignupRequest {
            email: "not-an-email".to_string(),
            ..ok
        };
        assert!(bad_email.validate().is_err());
    }

    #[test]
    fn test_empty_name_rejected() {
        let req = SignupRequest {
            name: String::new(),
            email: "ann@x.com".to_string(),
            password: "secret1".to_string(),
        };
        assert!(req.validate().is_err());
    }
}
