//! Authorization filter applied in front of every route.
//!
//! A request matching the permit-list passes straight through. Any other
//! request must carry a valid access token cookie; its subject is bound to the
//! request as an [`AuthenticatedUser`] extension.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::Method,
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::cookie::{ACCESS_COOKIE_NAME, get_cookie};
use super::errors::{ApiAuthError, AuthErrorKind};
use super::types::AuthenticatedUser;
use crate::jwt::{TokenCodec, TokenType};

/// A route exempt from authentication. `*` in the pattern matches exactly one
/// path segment.
#[derive(Debug, Clone)]
pub struct PermitRule {
    pub method: Method,
    pub pattern: &'static str,
}

impl PermitRule {
    pub const fn new(method: Method, pattern: &'static str) -> Self {
        Self { method, pattern }
    }

    pub fn matches(&self, method: &Method, path: &str) -> bool {
        if self.method != *method {
            return false;
        }

        let path = path.trim_end_matches('/');
        let pattern = self.pattern.trim_end_matches('/');

        let mut path_segments = path.split('/');
        let mut pattern_segments = pattern.split('/');
        loop {
            match (pattern_segments.next(), path_segments.next()) {
                (None, None) => return true,
                (Some("*"), Some(segment)) if !segment.is_empty() => {}
                (Some(expected), Some(segment)) if expected == segment => {}
                _ => return false,
            }
        }
    }
}

/// Fixed set of routes that bypass the filter.
#[derive(Debug, Clone)]
pub struct PermitList {
    rules: Vec<PermitRule>,
}

impl PermitList {
    pub fn new(rules: Vec<PermitRule>) -> Self {
        Self { rules }
    }

    /// The routes this service exposes without authentication.
    pub fn standard() -> Self {
        Self::new(vec![
            PermitRule::new(Method::GET, "/health"),
            PermitRule::new(Method::POST, "/api/users/register"),
            PermitRule::new(Method::POST, "/api/auth/login"),
            PermitRule::new(Method::POST, "/api/auth/refresh"),
            PermitRule::new(Method::POST, "/api/auth/logout"),
            PermitRule::new(Method::GET, "/api/auth/validate"),
            PermitRule::new(Method::GET, "/api/rooms"),
            PermitRule::new(Method::GET, "/api/rooms/*"),
            PermitRule::new(Method::GET, "/api/rooms/*/reservations"),
            PermitRule::new(Method::GET, "/api/reservations"),
        ])
    }

    pub fn permits(&self, method: &Method, path: &str) -> bool {
        self.rules.iter().any(|rule| rule.matches(method, path))
    }
}

/// State for the authorization middleware.
#[derive(Clone)]
pub struct FilterState {
    pub codec: Arc<TokenCodec>,
    pub permit_list: Arc<PermitList>,
}

/// Middleware: UNVALIDATED → VALIDATED (request continues) or REJECTED (401).
pub async fn authorize(
    State(state): State<FilterState>,
    mut request: Request,
    next: Next,
) -> Response {
    if state
        .permit_list
        .permits(request.method(), request.uri().path())
    {
        return next.run(request).await;
    }

    let Some(token) = get_cookie(request.headers(), ACCESS_COOKIE_NAME) else {
        return ApiAuthError::new(AuthErrorKind::MissingToken).into_response();
    };

    let Some(email) = state.codec.validate(token, TokenType::Access) else {
        tracing::debug!(path = %request.uri().path(), "Rejected invalid access token");
        return ApiAuthError::new(AuthErrorKind::InvalidToken).into_response();
    };

    request
        .extensions_mut()
        .insert(AuthenticatedUser { email });
    next.run(request).await
}
