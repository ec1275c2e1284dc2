//! Shared helpers for integration tests.
#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Method, Request, StatusCode, header},
};
use roombook::{ServerConfig, auth::hash_password, create_app, db::Database, jwt::TokenCodec};
use serde_json::Value;
use tower::ServiceExt;

pub const TEST_SECRET: &[u8] = b"test-jwt-secret-that-is-long-enough";

/// Login limit high enough that ordinary tests never hit it.
pub const RELAXED_LOGIN_LIMIT: u32 = 1000;

pub struct TestApp {
    pub app: Router,
    pub db: Database,
    pub codec: TokenCodec,
}

pub async fn create_test_app() -> TestApp {
    create_test_app_with_login_limit(RELAXED_LOGIN_LIMIT).await
}

pub async fn create_test_app_with_login_limit(login_rate_limit: u32) -> TestApp {
    let db = Database::open(":memory:")
        .await
        .expect("Failed to open test database");
    let config = ServerConfig {
        db: db.clone(),
        jwt_secret: TEST_SECRET.to_vec(),
        secure_cookies: false,
        bcrypt_cost: 4,
        login_rate_limit,
        trust_proxy: false,
    };
    TestApp {
        app: create_app(&config).expect("Failed to build app"),
        db,
        codec: TokenCodec::new(TEST_SECRET),
    }
}

/// Insert a user directly, bypassing registration validation.
pub async fn seed_user(db: &Database, email: &str, password: &str) -> i64 {
    let hash = hash_password(password, 4).await.expect("hash");
    db.users()
        .create(email, "Test User", &hash)
        .await
        .expect("create user")
}

/// Minimal browser-like cookie store honoring `Path` and `Max-Age=0`.
#[derive(Default, Debug)]
pub struct CookieJar {
    cookies: Vec<StoredCookie>,
}

#[derive(Debug)]
struct StoredCookie {
    name: String,
    value: String,
    path: String,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, headers: &HeaderMap) {
        for set_cookie in headers.get_all(header::SET_COOKIE) {
            let Ok(set_cookie) = set_cookie.to_str() else {
                continue;
            };
            let mut parts = set_cookie.split(';').map(str::trim);
            let Some((name, value)) = parts.next().and_then(|p| p.split_once('=')) else {
                continue;
            };

            let mut path = "/".to_string();
            let mut expired = false;
            for attr in parts {
                if let Some(p) = attr.strip_prefix("Path=") {
                    path = p.to_string();
                } else if attr == "Max-Age=0" {
                    expired = true;
                }
            }

            self.cookies.retain(|c| !(c.name == name && c.path == path));
            if !expired {
                self.cookies.push(StoredCookie {
                    name: name.to_string(),
                    value: value.to_string(),
                    path,
                });
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.cookies
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.value.as_str())
    }

    /// The `Cookie` header a browser would send to `path`.
    pub fn header_for(&self, path: &str) -> Option<String> {
        let pairs: Vec<String> = self
            .cookies
            .iter()
            .filter(|c| path_matches(&c.path, path))
            .map(|c| format!("{}={}", c.name, c.value))
            .collect();
        if pairs.is_empty() {
            None
        } else {
            Some(pairs.join("; "))
        }
    }
}

fn path_matches(cookie_path: &str, request_path: &str) -> bool {
    cookie_path == "/"
        || request_path == cookie_path
        || request_path
            .strip_prefix(cookie_path)
            .is_some_and(|rest| rest.starts_with('/'))
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    pub fn set_cookies(&self) -> Vec<String> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok().map(str::to_string))
            .collect()
    }
}

/// Send a request with the jar's cookies and store any cookies it sets.
pub async fn send(
    app: &Router,
    jar: &mut CookieJar,
    method: Method,
    path: &str,
    body: Option<Value>,
) -> TestResponse {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(cookie) = jar.header_for(path) {
        builder = builder.header(header::COOKIE, cookie);
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    jar.apply(&headers);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    TestResponse {
        status,
        headers,
        body,
    }
}

/// Seed a user and log them in, returning a jar holding both cookies.
pub async fn logged_in_jar(test: &TestApp, email: &str, password: &str) -> CookieJar {
    seed_user(&test.db, email, password).await;
    let mut jar = CookieJar::new();
    let response = send(
        &test.app,
        &mut jar,
        Method::POST,
        "/api/auth/login",
        Some(serde_json::json!({ "email": email, "password": password })),
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);
    jar
}
