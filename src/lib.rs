pub mod api;
pub mod auth;
pub mod cli;
pub mod db;
pub mod jwt;
pub mod rate_limit;

use api::create_api_router;
use auth::{AuthService, CookiePolicy, FilterState, PasswordError, PermitList, authorize};
use axum::{Json, Router, middleware, routing::get};
use db::Database;
use jwt::TokenCodec;
use rate_limit::RateLimitConfig;
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

pub struct ServerConfig {
    /// Database connection (cloneable, uses connection pool internally)
    pub db: Database,
    /// JWT secret for signing tokens
    pub jwt_secret: Vec<u8>,
    /// Whether to set Secure flag on cookies (should be true in production with HTTPS)
    pub secure_cookies: bool,
    /// bcrypt work factor for new password hashes
    pub bcrypt_cost: u32,
    /// Login attempts allowed per minute per client IP
    pub login_rate_limit: u32,
    /// Take the client IP from `X-Forwarded-For` (requires running behind a proxy)
    pub trust_proxy: bool,
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Create the application router with the given configuration.
///
/// Fails if the configured bcrypt cost is out of range.
pub fn create_app(config: &ServerConfig) -> Result<Router, PasswordError> {
    let rate_limit = Arc::new(RateLimitConfig::new(
        config.login_rate_limit,
        config.trust_proxy,
    ));
    build_router(config, rate_limit)
}

fn build_router(
    config: &ServerConfig,
    rate_limit: Arc<RateLimitConfig>,
) -> Result<Router, PasswordError> {
    let codec = Arc::new(TokenCodec::new(&config.jwt_secret));
    let auth = AuthService::new(
        codec.clone(),
        CookiePolicy::new(config.secure_cookies),
        config.bcrypt_cost,
    )?;

    let api_router = create_api_router(config.db.clone(), auth, config.bcrypt_cost, rate_limit);

    let filter = FilterState {
        codec,
        permit_list: Arc::new(PermitList::standard()),
    };

    // The filter wraps the outer router so it matches against full paths.
    Ok(Router::new()
        .route("/health", get(health))
        .nest("/api", api_router)
        .layer(middleware::from_fn_with_state(filter, authorize)))
}

/// Run the server on the given listener. This function blocks until the server exits.
/// Idle rate-limit buckets are pruned in the background while it runs.
pub async fn run_server(config: ServerConfig, listener: TcpListener) -> Result<(), std::io::Error> {
    let rate_limit = Arc::new(RateLimitConfig::new(
        config.login_rate_limit,
        config.trust_proxy,
    ));
    let app = build_router(&config, rate_limit.clone()).map_err(std::io::Error::other)?;

    let pruner = rate_limit.spawn_pruner();
    let make_service = app.into_make_service_with_connect_info::<SocketAddr>();
    let result = axum::serve(listener, make_service).await;
    pruner.abort();
    result
}

/// Start the server on the given port in a background task. Use port 0 to let the OS choose a random port.
/// Returns the actual address the server is listening on.
pub async fn start_server(
    config: ServerConfig,
    port: u16,
) -> Result<(tokio::task::JoinHandle<()>, SocketAddr), std::io::Error> {
    let listener = TcpListener::bind(("127.0.0.1", port)).await?;
    let local_addr = listener.local_addr()?;

    let handle = tokio::spawn(async move {
        if let Err(e) = run_server(config, listener).await {
            tracing::error!(error = %e, "Server error");
        }
    });

    Ok((handle, local_addr))
}
