//! Shared helper functions for handlers.

use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    Json,
};

use crate::error::ApiError;

/// JSON request body whose rejections use the `ApiError` shape: 400 `INVALID_JSON`.
#[derive(Debug)]
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ApiError>);

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => {
                tracing::debug!(reason = %rejection.body_text(), "rejected request body");
                Err(ApiError::bad_request(rejection.body_text(), "INVALID_JSON"))
            }
        }
    }
}

/// Parses an `{id}` path segment. Non-numeric and non-positive ids are rejected.
pub fn parse_event_id(raw: &str) -> Result<i32, (StatusCode, Json<ApiError>)> {
    raw.parse::<i32>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| ApiError::bad_request("invalid event id", "INVALID_EVENT_ID"))
}
