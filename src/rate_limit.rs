//! Rate limiting for authentication endpoints.
//!
//! Uses a token bucket algorithm with per-IP tracking to slow down password
//! guessing and signup spam.

use axum::{
    Json,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{Quota, RateLimiter, clock::DefaultClock, state::keyed::DefaultKeyedStateStore};
use serde_json::json;
use std::{num::NonZeroU32, sync::Arc, time::Duration};

use crate::auth::extract_client_ip;

/// Per-IP rate limiter.
pub type IpLimiter = RateLimiter<String, DefaultKeyedStateStore<String>, DefaultClock>;

/// Bucket key for requests whose client IP cannot be determined.
const UNKNOWN_CLIENT: &str = "unknown";

/// Default login attempts per minute per IP.
pub const DEFAULT_LOGIN_PER_MINUTE: u32 = 10;

/// Registrations per minute per IP.
const REGISTER_PER_MINUTE: u32 = 5;

/// How often idle per-IP buckets are dropped.
const PRUNE_INTERVAL: Duration = Duration::from_secs(60);

/// Rate limiting configuration for authentication endpoints.
#[derive(Clone)]
pub struct RateLimitConfig {
    /// Per-IP limiter for login attempts
    pub login: Arc<IpLimiter>,
    /// Per-IP limiter for user registration
    pub register: Arc<IpLimiter>,
    /// Take the client IP from `X-Forwarded-For`
    pub trust_proxy: bool,
}

impl RateLimitConfig {
    /// Create rate limiters allowing `login_per_minute` login attempts per IP.
    /// Zero is treated as one.
    pub fn new(login_per_minute: u32, trust_proxy: bool) -> Self {
        let login_per_minute = NonZeroU32::new(login_per_minute).unwrap_or(NonZeroU32::MIN);
        let register_per_minute = NonZeroU32::new(REGISTER_PER_MINUTE).unwrap_or(NonZeroU32::MIN);

        Self {
            login: Arc::new(RateLimiter::keyed(Quota::per_minute(login_per_minute))),
            register: Arc::new(RateLimiter::keyed(Quota::per_minute(register_per_minute))),
            trust_proxy,
        }
    }

    /// Drop buckets that have fully refilled, i.e. clients not seen recently.
    pub fn prune(&self) {
        self.login.retain_recent();
        self.register.retain_recent();
        self.login.shrink_to_fit();
        self.register.shrink_to_fit();
    }

    /// Prune both limiters every minute until the returned task is aborted.
    pub fn spawn_pruner(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(PRUNE_INTERVAL);
            loop {
                interval.tick().await;
                self.prune();
                tracing::trace!(
                    login_keys = self.login.len(),
                    register_keys = self.register.len(),
                    "Pruned rate limiters"
                );
            }
        })
    }

    fn client_key(&self, request: &Request) -> String {
        extract_client_ip(request, self.trust_proxy).unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
    }
}

fn too_many(message: &'static str) -> Response {
    (
        StatusCode::TOO_MANY_REQUESTS,
        Json(json!({ "error": "Too many requests", "message": message })),
    )
        .into_response()
}

/// Middleware for rate limiting login attempts.
pub async fn rate_limit_login(
    State(config): State<Arc<RateLimitConfig>>,
    request: Request,
    next: Next,
) -> Response {
    let key = config.client_key(&request);

    match config.login.check_key(&key) {
        Ok(_) => next.run(request).await,
        Err(_) => {
            tracing::warn!(client = %key, "Login rate limit exceeded");
            too_many("Too many login attempts. Please wait before trying again.")
        }
    }
}

/// Middleware for rate limiting user registration.
pub async fn rate_limit_register(
    State(config): State<Arc<RateLimitConfig>>,
    request: Request,
    next: Next,
) -> Response {
    let key = config.client_key(&request);

    match config.register.check_key(&key) {
        Ok(_) => next.run(request).await,
        Err(_) => too_many("Too many signup attempts. Please wait before trying again."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_limiter_is_per_key() {
        let config = RateLimitConfig::new(2, false);

        assert!(config.login.check_key(&"a".to_string()).is_ok());
        assert!(config.login.check_key(&"a".to_string()).is_ok());
        assert!(config.login.check_key(&"a".to_string()).is_err());
        assert!(config.login.check_key(&"b".to_string()).is_ok());
    }

    #[test]
    fn test_zero_limit_still_allows_one() {
        let config = RateLimitConfig::new(0, false);

        assert!(config.login.check_key(&"a".to_string()).is_ok());
        assert!(config.login.check_key(&"a".to_string()).is_err());
    }

    #[test]
    fn test_prune_keeps_active_clients() {
        let config = RateLimitConfig::new(2, false);

        assert!(config.login.check_key(&"a".to_string()).is_ok());
        assert!(config.login.check_key(&"a".to_string()).is_ok());
        config.prune();

        // The exhausted bucket survives pruning and stays limited
        assert_eq!(config.login.len(), 1);
        assert!(config.login.check_key(&"a".to_string()).is_err());
    }

    #[tokio::test]
    async fn test_pruner_runs_until_aborted() {
        let config = Arc::new(RateLimitConfig::new(2, false));
        let handle = config.clone().spawn_pruner();

        tokio::task::yield_now().await;
        assert!(!handle.is_finished());

        handle.abort();
        assert!(handle.await.unwrap_err().is_cancelled());
    }
}
