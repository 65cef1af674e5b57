//! Bearer token authentication middleware
//!
//! Applied to every route except `/_health`. When auth is disabled in the
//! configuration all requests pass.

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use super::{AppState, ErrorResponse};

/// Outcome of checking an `Authorization` header against the expected token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRejection {
    /// No header, or not a `Bearer` credential
    Missing,
    /// Bearer credential that does not match
    Mismatch,
}

impl AuthRejection {
    fn status(self) -> StatusCode {
        match self {
            AuthRejection::Missing => StatusCode::UNAUTHORIZED,
            AuthRejection::Mismatch => StatusCode::FORBIDDEN,
        }
    }

    fn message(self) -> &'static str {
        match self {
            AuthRejection::Missing => "Missing or invalid Authorization header",
            AuthRejection::Mismatch => "Invalid token",
        }
    }
}

/// Check an `Authorization` header value
pub fn check_bearer(header: Option<&str>, expected: &str) -> Result<(), AuthRejection> {
    let token = header
        .and_then(|value| value.trim().split_once(' '))
        .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("bearer"))
        .map(|(_, token)| token.trim())
        .filter(|token| !token.is_empty() && !token.contains(' '))
        .ok_or(AuthRejection::Missing)?;

    if token == expected {
        Ok(())
    } else {
        Err(AuthRejection::Mismatch)
    }
}

/// Authentication middleware
pub async fn require_bearer(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let Some(expected) = state.auth_token.as_deref() else {
        return next.run(request).await;
    };

    let header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    match check_bearer(header, expected) {
        Ok(()) => next.run(request).await,
        Err(rejection) => {
            tracing::warn!(
                path = request.uri().path(),
                "Rejected request: {}",
                rejection.message()
            );
            (rejection.status(), Json(ErrorResponse::new(rejection.message()))).into_response()
        }
    }
}
