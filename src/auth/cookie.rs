//! Cookie rendering and parsing for the token cookies.

use axum::http::header;

/// Cookie name for the access token (short-lived, 1 hour).
pub const ACCESS_COOKIE_NAME: &str = "access_token";

/// Cookie name for the refresh token (long-lived, 24 hours).
pub const REFRESH_COOKIE_NAME: &str = "refresh_token";

/// The refresh cookie is only ever sent to this path.
pub const REFRESH_COOKIE_PATH: &str = "/api/auth/refresh";

/// Extract a cookie value from the Cookie header.
pub fn get_cookie<'a>(headers: &'a axum::http::HeaderMap, name: &str) -> Option<&'a str> {
    let cookie_header = headers.get(header::COOKIE)?.to_str().ok()?;
    for part in cookie_header.split(';') {
        let part = part.trim();
        if let Some((key, value)) = part.split_once('=') {
            if key.trim() == name {
                return Some(value.trim());
            }
        }
    }
    None
}

/// Path a token cookie is scoped to.
pub fn cookie_path(name: &str) -> &'static str {
    if name == REFRESH_COOKIE_NAME {
        REFRESH_COOKIE_PATH
    } else {
        "/"
    }
}

/// Attributes applied to every token cookie.
#[derive(Debug, Clone, Copy, Default)]
pub struct CookiePolicy {
    /// Add the `Secure` attribute (only when served over HTTPS)
    pub secure: bool,
}

impl CookiePolicy {
    pub fn new(secure: bool) -> Self {
        Self { secure }
    }

    /// Render a `Set-Cookie` value that stores `value` for `max_age` seconds.
    pub fn attach(&self, name: &str, value: &str, max_age: u64) -> String {
        format!(
            "{}={}; HttpOnly; SameSite=Strict; Path={}; Max-Age={}{}",
            name,
            value,
            cookie_path(name),
            max_age,
            self.secure_suffix()
        )
    }

    /// Render a `Set-Cookie` value that deletes the cookie on the client.
    pub fn remove(&self, name: &str) -> String {
        format!(
            "{}=; HttpOnly; SameSite=Strict; Path={}; Max-Age=0{}",
            name,
            cookie_path(name),
            self.secure_suffix()
        )
    }

    fn secure_suffix(&self) -> &'static str {
        if self.secure { "; Secure" } else { "" }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_get_cookie_simple() {
        let mut headers = axum::http::HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("access_token=abc123"),
        );

        assert_eq!(get_cookie(&headers, "access_token"), Some("abc123"));
    }

    #[test]
    fn test_get_cookie_multiple() {
        let mut headers = axum::http::HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("foo=bar; access_token=abc123; refresh_token=xyz789"),
        );

        assert_eq!(get_cookie(&headers, "access_token"), Some("abc123"));
        assert_eq!(get_cookie(&headers, "refresh_token"), Some("xyz789"));
        assert_eq!(get_cookie(&headers, "foo"), Some("bar"));
    }

    #[test]
    fn test_get_cookie_not_found() {
        let mut headers = axum::http::HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("foo=bar"));

        assert_eq!(get_cookie(&headers, "access_token"), None);
        assert_eq!(get_cookie(&headers, "refresh_token"), None);
    }

    #[test]
    fn test_get_cookie_no_header() {
        let headers = axum::http::HeaderMap::new();
        assert_eq!(get_cookie(&headers, "access_token"), None);
    }

    #[test]
    fn test_attach_access_cookie() {
        let cookie = CookiePolicy::new(false).attach(ACCESS_COOKIE_NAME, "tok", 3600);
        assert_eq!(
            cookie,
            "access_token=tok; HttpOnly; SameSite=Strict; Path=/; Max-Age=3600"
        );
    }

    #[test]
    fn test_attach_refresh_cookie_is_path_scoped() {
        let cookie = CookiePolicy::new(false).attach(REFRESH_COOKIE_NAME, "tok", 86400);
        assert!(cookie.contains("Path=/api/auth/refresh;"));
        assert!(cookie.contains("Max-Age=86400"));
        assert!(cookie.contains("HttpOnly"));
        assert!(!cookie.contains("Secure"));
    }

    #[test]
    fn test_remove_keeps_path_rules() {
        let policy = CookiePolicy::new(true);

        let access = policy.remove(ACCESS_COOKIE_NAME);
        assert!(access.starts_with("access_token=;"));
        assert!(access.contains("Path=/;"));
        assert!(access.contains("Max-Age=0"));
        assert!(access.ends_with("; Secure"));

        let refresh = policy.remove(REFRESH_COOKIE_NAME);
        assert!(refresh.starts_with("refresh_token=;"));
        assert!(refresh.contains("Path=/api/auth/refresh;"));
        assert!(refresh.contains("Max-Age=0"));
    }
}
