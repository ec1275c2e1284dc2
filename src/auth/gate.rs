//! Credential verification and token pair issuance.

use std::future::Future;
use std::sync::Arc;

use tracing::{error, warn};

use super::errors::AuthErrorKind;
use super::types::Credentials;
use crate::db::{User, UserStore};
use crate::jwt::{IssuedToken, TokenCodec, TokenType};

/// Lookup of stored credentials by email.
pub trait CredentialStore {
    fn find_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<Option<User>, sqlx::Error>> + Send;
}

impl CredentialStore for UserStore {
    fn find_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<Option<User>, sqlx::Error>> + Send {
        self.get_by_email(email)
    }
}

/// Errors from password hashing.
#[derive(Debug)]
pub enum PasswordError {
    Hash(bcrypt::BcryptError),
    Join(tokio::task::JoinError),
}

impl std::fmt::Display for PasswordError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PasswordError::Hash(e) => write!(f, "Password hashing failed: {}", e),
            PasswordError::Join(e) => write!(f, "Password hashing task failed: {}", e),
        }
    }
}

impl std::error::Error for PasswordError {}

/// Hash a password with bcrypt on the blocking thread pool.
pub async fn hash_password(password: &str, cost: u32) -> Result<String, PasswordError> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost).map_err(PasswordError::Hash))
        .await
        .map_err(PasswordError::Join)?
}

/// Verify a password against a bcrypt hash on the blocking thread pool.
pub async fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let password = password.to_string();
    let hash = hash.to_string();
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash).map_err(PasswordError::Hash))
        .await
        .map_err(PasswordError::Join)?
}

/// Access and refresh token issued together on login.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access: IssuedToken,
    pub refresh: IssuedToken,
}

const DUMMY_PASSWORD: &str = "roombook-dummy-password";

/// Verifies credentials and issues token pairs.
#[derive(Clone)]
pub struct AuthGate {
    codec: Arc<TokenCodec>,
    /// Hash checked for unknown emails so timing matches a real verification.
    /// Computed at construction with the configured cost.
    dummy_hash: Arc<str>,
}

impl AuthGate {
    /// Fails only if `cost` is outside the range bcrypt accepts.
    pub fn new(codec: Arc<TokenCodec>, cost: u32) -> Result<Self, PasswordError> {
        let dummy_hash = bcrypt::hash(DUMMY_PASSWORD, cost).map_err(PasswordError::Hash)?;
        Ok(Self {
            codec,
            dummy_hash: dummy_hash.into(),
        })
    }

    /// Check `credentials` against `store`. On success returns the user and a
    /// fresh token pair carrying the user's email as subject.
    pub async fn authenticate<S: CredentialStore>(
        &self,
        store: &S,
        credentials: &Credentials,
    ) -> Result<(User, TokenPair), AuthErrorKind> {
        let user = store
            .find_by_email(credentials.email.trim())
            .await
            .map_err(|e| {
                error!("Failed to look up user: {}", e);
                AuthErrorKind::Backend
            })?;

        let hash = match &user {
            Some(user) => user.password_hash.clone(),
            None => self.dummy_hash.to_string(),
        };

        let matches = match verify_password(&credentials.password, &hash).await {
            Ok(matches) => matches,
            Err(e) => {
                if user.is_some() {
                    warn!(email = %credentials.email, "Stored password hash is unusable: {}", e);
                }
                false
            }
        };

        let user = match user {
            Some(user) if matches => user,
            _ => return Err(AuthErrorKind::BadCredentials),
        };

        let pair = self.issue_pair(&user.email)?;
        Ok((user, pair))
    }

    fn issue_pair(&self, subject: &str) -> Result<TokenPair, AuthErrorKind> {
        let issue = |token_type: TokenType| {
            self.codec.issue(subject, token_type).map_err(|e| {
                error!("Failed to issue {:?} token: {}", token_type, e);
                AuthErrorKind::Backend
            })
        };

        Ok(TokenPair {
            access: issue(TokenType::Access)?,
            refresh: issue(TokenType::Refresh)?,
        })
    }
}
