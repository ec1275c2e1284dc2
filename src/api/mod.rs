mod auth;
mod error;
mod reservations;
mod rooms;
mod users;

use axum::Router;
use std::sync::Arc;

use crate::auth::AuthService;
use crate::db::Database;
use crate::rate_limit::RateLimitConfig;

/// Create the API router.
pub fn create_api_router(
    db: Database,
    auth: AuthService,
    bcrypt_cost: u32,
    rate_limit: Arc<RateLimitConfig>,
) -> Router {
    let auth_state = auth::AuthState {
        db: db.clone(),
        auth,
    };

    let users_state = users::UsersState {
        db: db.clone(),
        bcrypt_cost,
    };

    let rooms_state = rooms::RoomsState { db: db.clone() };

    let reservations_state = reservations::ReservationsState { db };

    Router::new()
        .nest("/auth", auth::router(auth_state, rate_limit.clone()))
        .nest("/users", users::router(users_state, rate_limit))
        .nest("/rooms", rooms::router(rooms_state))
        .nest("/reservations", reservations::router(reservations_state))
}
