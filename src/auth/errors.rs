//! Authentication error types.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Internal auth error kind used by the core authentication logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthErrorKind {
    /// Unknown email or wrong password
    BadCredentials,
    /// No token cookie on the request
    MissingToken,
    /// Malformed, expired, mis-signed or wrong-type token
    InvalidToken,
    /// Token subject no longer exists in the user store
    UnknownUser,
    /// The user store could not be queried
    Backend,
}

impl AuthErrorKind {
    pub fn status_code(self) -> StatusCode {
        match self {
            AuthErrorKind::BadCredentials
            | AuthErrorKind::MissingToken
            | AuthErrorKind::InvalidToken
            | AuthErrorKind::UnknownUser => StatusCode::UNAUTHORIZED,
            AuthErrorKind::Backend => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            // Same text whether or not the account exists
            AuthErrorKind::BadCredentials => "Invalid email or password",
            AuthErrorKind::MissingToken => "Not authenticated",
            AuthErrorKind::InvalidToken => "Invalid or expired token",
            AuthErrorKind::UnknownUser => "Invalid or expired token",
            AuthErrorKind::Backend => "Internal server error",
        }
    }
}

/// JSON body for authentication failures.
#[derive(Debug, Serialize)]
pub struct AuthErrorBody {
    pub error: &'static str,
    pub message: &'static str,
}

/// Rejection produced by the authorization filter and the `Auth` extractor.
/// Never touches cookies.
#[derive(Debug)]
pub struct ApiAuthError {
    pub(super) kind: AuthErrorKind,
}

impl ApiAuthError {
    pub(super) fn new(kind: AuthErrorKind) -> Self {
        Self { kind }
    }

    pub fn kind(&self) -> AuthErrorKind {
        self.kind
    }
}

impl IntoResponse for ApiAuthError {
    fn into_response(self) -> Response {
        let error = match self.kind {
            AuthErrorKind::Backend => "Internal server error",
            _ => "Unauthorized",
        };

        (
            self.kind.status_code(),
            Json(AuthErrorBody {
                error,
                message: self.kind.message(),
            }),
        )
            .into_response()
    }
}
