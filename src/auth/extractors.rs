//! Axum extractors for authentication.

use axum::{extract::FromRequestParts, http::request::Parts};

use super::errors::{ApiAuthError, AuthErrorKind};
use super::types::AuthenticatedUser;

/// Extractor for handlers behind the authorization filter.
/// Yields the identity the filter bound to the request; rejects with 401 if
/// the route was reached without one (e.g. a permit-listed route).
pub struct Auth(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for Auth
where
    S: Send + Sync,
{
    type Rejection = ApiAuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .map(Auth)
            .ok_or_else(|| ApiAuthError::new(AuthErrorKind::MissingToken))
    }
}
