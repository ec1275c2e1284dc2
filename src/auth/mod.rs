//! Stateless JWT authentication with cookie-carried tokens.
//!
//! Dual-token system: short-lived access tokens (1 hour, sent on every
//! request) and long-lived refresh tokens (24 hours, scoped to the refresh
//! endpoint). Nothing is stored server-side; logout only clears cookies.

mod cookie;
mod errors;
mod extractors;
mod filter;
mod gate;
mod ip;
mod reply;
mod service;
mod types;

pub use cookie::{
    ACCESS_COOKIE_NAME, CookiePolicy, REFRESH_COOKIE_NAME, REFRESH_COOKIE_PATH, cookie_path,
    get_cookie,
};
pub use errors::{ApiAuthError, AuthErrorBody, AuthErrorKind};
pub use extractors::Auth;
pub use filter::{FilterState, PermitList, PermitRule, authorize};
pub use gate::{
    AuthGate, CredentialStore, PasswordError, TokenPair, hash_password, verify_password,
};
pub use ip::extract_client_ip;
pub use reply::AuthReply;
pub use service::AuthService;
pub use types::{AuthenticatedUser, Credentials};
