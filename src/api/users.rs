use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;
use std::sync::Arc;

use super::error::{ApiError, ResultExt, UniqueResultExt};
use crate::auth::{Auth, hash_password};
use crate::db::Database;
use crate::rate_limit::{RateLimitConfig, rate_limit_register};

const MIN_PASSWORD_LENGTH: usize = 6;
// bcrypt ignores everything past 72 bytes
const MAX_PASSWORD_LENGTH: usize = 72;
const MAX_NAME_LENGTH: usize = 64;
const MAX_EMAIL_LENGTH: usize = 254;

#[derive(Clone)]
pub struct UsersState {
    pub db: Database,
    pub bcrypt_cost: u32,
}

pub fn router(state: UsersState, rate_limit: Arc<RateLimitConfig>) -> Router {
    let register_router = Router::new()
        .route("/register", post(register))
        .with_state(state.clone())
        .layer(middleware::from_fn_with_state(rate_limit, rate_limit_register));

    Router::new()
        .route("/me", get(me))
        .with_state(state)
        .merge(register_router)
}

#[derive(Deserialize)]
struct RegisterRequest {
    email: String,
    password: String,
    name: String,
}

fn validate_email(email: &str) -> Result<(), ApiError> {
    if email.is_empty() || email.len() > MAX_EMAIL_LENGTH {
        return Err(ApiError::bad_request("Email must be 1 to 254 characters"));
    }

    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if !valid {
        return Err(ApiError::bad_request("Invalid email address"));
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), ApiError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(ApiError::bad_request(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }
    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(ApiError::bad_request(format!(
            "Password must be at most {} bytes",
            MAX_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

async fn register(
    State(state): State<UsersState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let email = payload.email.trim();
    let name = payload.name.trim();

    validate_email(email)?;
    validate_password(&payload.password)?;

    if name.is_empty() {
        return Err(ApiError::bad_request("Name cannot be empty"));
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(ApiError::bad_request(format!(
            "Name cannot be longer than {} characters",
            MAX_NAME_LENGTH
        )));
    }

    let available = state
        .db
        .users()
        .is_email_available(email)
        .await
        .db_err("Failed to check email availability")?;

    if !available {
        return Err(ApiError::conflict("Email is already registered"));
    }

    let password_hash = hash_password(&payload.password, state.bcrypt_cost)
        .await
        .map_err(|e| {
            tracing::error!("Failed to hash password: {}", e);
            ApiError::internal("Failed to create user")
        })?;

    let id = state
        .db
        .users()
        .create(email, name, &password_hash)
        .await
        // A concurrent registration can win between the check and the insert
        .unique_err("Email is already registered", "Failed to create user")?;

    let user = state
        .db
        .users()
        .get_by_id(id)
        .await
        .db_err("Failed to load new user")?
        .ok_or_else(|| ApiError::internal("User vanished after creation"))?;

    tracing::info!(email = %user.email, "User registered");

    Ok((StatusCode::CREATED, Json(user.profile())))
}

async fn me(
    State(state): State<UsersState>,
    Auth(auth): Auth,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .db
        .users()
        .get_by_email(&auth.email)
        .await
        .db_err("Failed to get user")?
        .ok_or_else(|| ApiError::unauthorized("User no longer exists"))?;

    Ok(Json(user.profile()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email() {
        assert!(validate_email("a@b.com").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("@b.com").is_err());
        assert!(validate_email("a@").is_err());
        assert!(validate_email("a@b@c").is_err());
        assert!(validate_email("a b@c.com").is_err());
    }

    #[test]
    fn test_validate_password_length() {
        assert!(validate_password("short").is_err());
        assert!(validate_password("correct").is_ok());
        assert!(validate_password("long-enough").is_ok());
        assert!(validate_password(&"x".repeat(73)).is_err());
    }
}
