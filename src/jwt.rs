//! JWT token generation and validation.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Token type for distinguishing access vs refresh tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    /// Short-lived access token (1 hour), sent on every request
    Access,
    /// Long-lived refresh token (24 hours), only sent to the refresh endpoint
    Refresh,
}

impl TokenType {
    /// Lifetime of a token of this type, in seconds.
    pub fn duration(self) -> u64 {
        match self {
            TokenType::Access => ACCESS_TOKEN_DURATION_SECS,
            TokenType::Refresh => REFRESH_TOKEN_DURATION_SECS,
        }
    }
}

/// JWT claims shared by both token types.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user email)
    pub sub: String,
    /// Token type
    #[serde(rename = "typ")]
    pub token_type: TokenType,
    /// Issued at (Unix timestamp)
    pub iat: u64,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
}

/// Access token duration: 1 hour
pub const ACCESS_TOKEN_DURATION_SECS: u64 = 60 * 60;

/// Refresh token duration: 24 hours
pub const REFRESH_TOKEN_DURATION_SECS: u64 = 24 * 60 * 60;

/// Signs and verifies access and refresh tokens with a shared HS256 secret.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

/// A freshly signed token.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// The JWT token string
    pub token: String,
    pub issued_at: u64,
    pub expires_at: u64,
    /// Token duration in seconds (used as cookie Max-Age)
    pub duration: u64,
}

/// Current Unix time in seconds.
pub fn unix_now() -> Result<u64, TokenError> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|_| TokenError::TimeError)
}

impl TokenCodec {
    /// Create a new codec with the given secret.
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
        }
    }

    /// Issue a token of the given type for `subject`, valid from now.
    pub fn issue(&self, subject: &str, token_type: TokenType) -> Result<IssuedToken, TokenError> {
        self.issue_at(subject, token_type, unix_now()?)
    }

    /// Issue a token as if the current time were `now`.
    pub fn issue_at(
        &self,
        subject: &str,
        token_type: TokenType,
        now: u64,
    ) -> Result<IssuedToken, TokenError> {
        let duration = token_type.duration();
        let claims = Claims {
            sub: subject.to_string(),
            token_type,
            iat: now,
            exp: now + duration,
        };

        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(TokenError::Encoding)?;

        Ok(IssuedToken {
            token,
            issued_at: now,
            expires_at: claims.exp,
            duration,
        })
    }

    /// Validate a token against the current time. Returns the subject, or
    /// `None` for anything malformed, expired, mis-signed or of the wrong type.
    pub fn validate(&self, token: &str, token_type: TokenType) -> Option<String> {
        let now = unix_now().ok()?;
        self.validate_at(token, token_type, now)
    }

    /// Same as [`validate`](Self::validate) with an explicit clock.
    pub fn validate_at(&self, token: &str, token_type: TokenType, now: u64) -> Option<String> {
        match self.decode_at(token, token_type, now) {
            Ok(claims) => Some(claims.sub),
            Err(e) => {
                tracing::debug!(error = %e, expected = ?token_type, "Rejected token");
                None
            }
        }
    }

    /// Decode and fully check a token, reporting why it was rejected.
    pub fn decode_at(
        &self,
        token: &str,
        token_type: TokenType,
        now: u64,
    ) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        // Expiry is checked below against `now` so the boundary is exact.
        validation.validate_exp = false;

        let token_data = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(TokenError::Decoding)?;
        let claims = token_data.claims;

        if claims.token_type != token_type {
            return Err(TokenError::WrongTokenType);
        }

        if now >= claims.exp {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }
}

/// Errors that can occur during JWT operations.
#[derive(Debug)]
pub enum TokenError {
    /// Error encoding the token
    Encoding(jsonwebtoken::errors::Error),
    /// Error decoding the token (bad signature, malformed, missing claims)
    Decoding(jsonwebtoken::errors::Error),
    /// Token is past its expiration time
    Expired,
    /// System time error
    TimeError,
    /// Wrong token type (e.g., using refresh token as access token)
    WrongTokenType,
}

impl std::fmt::Display for TokenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenError::Encoding(e) => write!(f, "Failed to encode token: {}", e),
            TokenError::Decoding(e) => write!(f, "Failed to decode token: {}", e),
            TokenError::Expired => write!(f, "Token has expired"),
            TokenError::TimeError => write!(f, "System time error"),
            TokenError::WrongTokenType => write!(f, "Wrong token type"),
        }
    }
}

impl std::error::Error for TokenError {}
