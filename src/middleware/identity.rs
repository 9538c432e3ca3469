//! Caller identity from the `X-User-ID` header.
//!
//! The header is trusted as-is; it is a stand-in for real authentication.

use axum::{
    extract::Request,
    http::{header::HeaderName, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use tracing::debug;

use crate::error::ApiError;

pub static USER_ID_HEADER: HeaderName = HeaderName::from_static("x-user-id");

/// Authenticated caller, inserted into request extensions by [`require_identity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity(pub i32);

impl Identity {
    pub fn user_id(self) -> i32 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IdentityError {
    Missing,
    Invalid,
}

impl IntoResponse for IdentityError {
    fn into_response(self) -> Response {
        let body = match self {
            IdentityError::Missing => ApiError::new("authentication required", "MISSING_USER_ID"),
            IdentityError::Invalid => ApiError::new(
                "X-User-ID must be a positive integer",
                "INVALID_USER_ID",
            ),
        };
        (StatusCode::UNAUTHORIZED, Json(body)).into_response()
    }
}

fn identity_from_headers(headers: &HeaderMap) -> Result<Identity, IdentityError> {
    let raw = headers
        .get(&USER_ID_HEADER)
        .ok_or(IdentityError::Missing)?
        .to_str()
        .map_err(|_| IdentityError::Invalid)?;

    match raw.trim().parse::<i32>() {
        Ok(id) if id > 0 => Ok(Identity(id)),
        _ => Err(IdentityError::Invalid),
    }
}

/// Rejects requests without a usable identity with 401.
pub async fn require_identity(mut req: Request, next: Next) -> Result<Response, Response> {
    let identity = identity_from_headers(req.headers()).map_err(|e| {
        debug!(reason = ?e, uri = %req.uri(), "Rejected request without identity");
        e.into_response()
    })?;

    req.extensions_mut().insert(identity);
    Ok(next.run(req).await)
}
