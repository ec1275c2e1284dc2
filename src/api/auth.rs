//! Session endpoints.
//!
//! - POST `/login` - Verify credentials, set access and refresh cookies
//! - POST `/refresh` - Exchange the refresh cookie for a new access cookie
//! - POST `/logout` - Clear both cookies
//! - GET `/validate` - Report whether the access cookie is valid
//!
//! All four are permit-listed and produce their own 401 bodies.

use axum::{
    Json, Router,
    extract::State,
    http::HeaderMap,
    middleware,
    routing::{get, post},
};
use std::sync::Arc;

use crate::auth::{AuthReply, AuthService, Credentials};
use crate::db::Database;
use crate::rate_limit::{RateLimitConfig, rate_limit_login};

#[derive(Clone)]
pub struct AuthState {
    pub db: Database,
    pub auth: AuthService,
}

pub fn router(state: AuthState, rate_limit: Arc<RateLimitConfig>) -> Router {
    let login_router = Router::new()
        .route("/login", post(login))
        .with_state(state.clone())
        .layer(middleware::from_fn_with_state(rate_limit, rate_limit_login));

    Router::new()
        .route("/refresh", post(refresh))
        .route("/logout", post(logout))
        .route("/validate", get(validate))
        .with_state(state)
        .merge(login_router)
}

async fn login(State(state): State<AuthState>, Json(credentials): Json<Credentials>) -> AuthReply {
    state.auth.login(&state.db.users(), &credentials).await
}

async fn refresh(State(state): State<AuthState>, headers: HeaderMap) -> AuthReply {
    state.auth.refresh(&state.db.users(), &headers).await
}

async fn logout(State(state): State<AuthState>) -> AuthReply {
    state.auth.logout()
}

async fn validate(State(state): State<AuthState>, headers: HeaderMap) -> AuthReply {
    state.auth.validate(&state.db.users(), &headers).await
}
