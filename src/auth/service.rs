//! Login, refresh, logout and validate operations.
//!
//! Each operation returns an [`AuthReply`]; nothing here writes to a response
//! directly.

use std::sync::Arc;

use axum::http::{HeaderMap, StatusCode};
use serde_json::json;
use tracing::{info, warn};

use super::cookie::{ACCESS_COOKIE_NAME, CookiePolicy, REFRESH_COOKIE_NAME, get_cookie};
use super::errors::AuthErrorKind;
use super::gate::{AuthGate, CredentialStore, PasswordError};
use super::reply::AuthReply;
use super::types::Credentials;
use crate::jwt::{TokenCodec, TokenType};

#[derive(Clone)]
pub struct AuthService {
    codec: Arc<TokenCodec>,
    gate: AuthGate,
    cookies: CookiePolicy,
}

fn failure(kind: AuthErrorKind) -> AuthReply {
    let error = match kind {
        AuthErrorKind::Backend => "Internal server error",
        _ => "Authentication failed",
    };
    AuthReply::new(
        kind.status_code(),
        json!({ "error": error, "message": kind.message() }),
    )
}

impl AuthService {
    pub fn new(
        codec: Arc<TokenCodec>,
        cookies: CookiePolicy,
        bcrypt_cost: u32,
    ) -> Result<Self, PasswordError> {
        Ok(Self {
            gate: AuthGate::new(codec.clone(), bcrypt_cost)?,
            codec,
            cookies,
        })
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// Verify credentials and set both token cookies.
    pub async fn login<S: CredentialStore>(
        &self,
        store: &S,
        credentials: &Credentials,
    ) -> AuthReply {
        let (user, pair) = match self.gate.authenticate(store, credentials).await {
            Ok(result) => result,
            Err(kind) => {
                if kind == AuthErrorKind::BadCredentials {
                    warn!(email = %credentials.email, "Failed login attempt");
                }
                return failure(kind);
            }
        };

        info!(email = %user.email, "User logged in");

        AuthReply::ok(json!({ "message": "Login successful", "user": user.profile() }))
            .with_cookie(self.cookies.attach(
                ACCESS_COOKIE_NAME,
                &pair.access.token,
                pair.access.duration,
            ))
            .with_cookie(self.cookies.attach(
                REFRESH_COOKIE_NAME,
                &pair.refresh.token,
                pair.refresh.duration,
            ))
    }

    /// Mint a new access token from the refresh cookie. The refresh token
    /// itself is not rotated. Failures touch no cookies.
    pub async fn refresh<S: CredentialStore>(&self, store: &S, headers: &HeaderMap) -> AuthReply {
        let subject = match self.subject_from_cookie(headers, REFRESH_COOKIE_NAME, TokenType::Refresh)
        {
            Ok(subject) => subject,
            Err(kind) => return failure(kind),
        };

        // The account may have been removed since the refresh token was issued.
        match store.find_by_email(&subject).await {
            Ok(Some(_)) => {}
            Ok(None) => return failure(AuthErrorKind::UnknownUser),
            Err(e) => {
                tracing::error!("Failed to look up user: {}", e);
                return failure(AuthErrorKind::Backend);
            }
        }

        let access = match self.codec.issue(&subject, TokenType::Access) {
            Ok(access) => access,
            Err(e) => {
                tracing::error!("Failed to issue access token: {}", e);
                return failure(AuthErrorKind::Backend);
            }
        };

        AuthReply::ok(json!({ "message": "Token refreshed" })).with_cookie(self.cookies.attach(
            ACCESS_COOKIE_NAME,
            &access.token,
            access.duration,
        ))
    }

    /// Clear both cookies on the client. Tokens already handed out stay valid
    /// until they expire.
    pub fn logout(&self) -> AuthReply {
        AuthReply::ok(json!({ "message": "Logout successful" }))
            .with_cookie(self.cookies.remove(ACCESS_COOKIE_NAME))
            .with_cookie(self.cookies.remove(REFRESH_COOKIE_NAME))
    }

    /// Report whether the access cookie is valid, with the user profile.
    pub async fn validate<S: CredentialStore>(&self, store: &S, headers: &HeaderMap) -> AuthReply {
        let invalid = |status: StatusCode| AuthReply::new(status, json!({ "valid": false }));

        let subject = match self.subject_from_cookie(headers, ACCESS_COOKIE_NAME, TokenType::Access)
        {
            Ok(subject) => subject,
            Err(kind) => return invalid(kind.status_code()),
        };

        match store.find_by_email(&subject).await {
            Ok(Some(user)) => AuthReply::ok(json!({ "valid": true, "user": user.profile() })),
            Ok(None) => invalid(StatusCode::UNAUTHORIZED),
            Err(e) => {
                tracing::error!("Failed to look up user: {}", e);
                invalid(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }

    /// Extract the named cookie and validate it as `token_type`.
    pub fn subject_from_cookie(
        &self,
        headers: &HeaderMap,
        name: &str,
        token_type: TokenType,
    ) -> Result<String, AuthErrorKind> {
        let token = get_cookie(headers, name).ok_or(AuthErrorKind::MissingToken)?;
        self.codec
            .validate(token, token_type)
            .ok_or(AuthErrorKind::InvalidToken)
    }
}
