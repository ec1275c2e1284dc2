//! Tests for user registration and the current-user endpoint.

mod common;

use axum::http::{Method, StatusCode};
use common::{CookieJar, create_test_app, send};
use serde_json::json;

#[tokio::test]
async fn test_register_then_login() {
    let test = create_test_app().await;
    let mut jar = CookieJar::new();

    let register = send(
        &test.app,
        &mut jar,
        Method::POST,
        "/api/users/register",
        Some(json!({ "email": "new@b.com", "password": "long-enough", "name": "New" })),
    )
    .await;
    assert_eq!(register.status, StatusCode::CREATED);
    assert_eq!(register.body["email"], "new@b.com");
    assert_eq!(register.body["name"], "New");
    assert!(register.body.get("password_hash").is_none());
    // Registration does not log the user in
    assert!(register.set_cookies().is_empty());

    let login = send(
        &test.app,
        &mut jar,
        Method::POST,
        "/api/auth/login",
        Some(json!({ "email": "new@b.com", "password": "long-enough" })),
    )
    .await;
    assert_eq!(login.status, StatusCode::OK);

    let me = send(&test.app, &mut jar, Method::GET, "/api/users/me", None).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["email"], "new@b.com");
    assert_eq!(me.body["id"], register.body["id"]);
}

#[tokio::test]
async fn test_register_duplicate_email_is_conflict() {
    let test = create_test_app().await;
    let mut jar = CookieJar::new();
    let body = json!({ "email": "dup@b.com", "password": "long-enough", "name": "Dup" });

    let first = send(
        &test.app,
        &mut jar,
        Method::POST,
        "/api/users/register",
        Some(body),
    )
    .await;
    assert_eq!(first.status, StatusCode::CREATED);

    let second = send(
        &test.app,
        &mut jar,
        Method::POST,
        "/api/users/register",
        Some(json!({ "email": "DUP@b.com", "password": "long-enough", "name": "Dup" })),
    )
    .await;
    assert_eq!(second.status, StatusCode::CONFLICT);
    assert_eq!(second.body["error"], "Conflict");
}

#[tokio::test]
async fn test_register_validation() {
    let test = create_test_app().await;
    let mut jar = CookieJar::new();

    let cases = [
        json!({ "email": "not-an-email", "password": "long-enough", "name": "X" }),
        json!({ "email": "a@b.com", "password": "short", "name": "X" }),
        json!({ "email": "a@b.com", "password": "long-enough", "name": "   " }),
    ];

    for body in cases {
        let response = send(
            &test.app,
            &mut jar,
            Method::POST,
            "/api/users/register",
            Some(body.clone()),
        )
        .await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "body: {}", body);
        assert_eq!(response.body["error"], "Bad Request");
    }
}

#[tokio::test]
async fn test_register_rate_limited() {
    let test = create_test_app().await;
    let mut jar = CookieJar::new();
    let invalid = json!({ "email": "x", "password": "x", "name": "x" });

    for _ in 0..5 {
        let response = send(
            &test.app,
            &mut jar,
            Method::POST,
            "/api/users/register",
            Some(invalid.clone()),
        )
        .await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
    }

    let response = send(
        &test.app,
        &mut jar,
        Method::POST,
        "/api/users/register",
        Some(invalid),
    )
    .await;
    assert_eq!(response.status, StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_concurrent_duplicate_registrations() {
    let test = create_test_app().await;
    let body = json!({ "email": "race@b.com", "password": "long-enough", "name": "Race" });

    let mut first_jar = CookieJar::new();
    let mut second_jar = CookieJar::new();
    let (first, second) = tokio::join!(
        send(
            &test.app,
            &mut first_jar,
            Method::POST,
            "/api/users/register",
            Some(body.clone()),
        ),
        send(
            &test.app,
            &mut second_jar,
            Method::POST,
            "/api/users/register",
            Some(body),
        ),
    );

    let mut statuses = [first.status, second.status];
    statuses.sort();
    assert_eq!(statuses, [StatusCode::CREATED, StatusCode::CONFLICT]);
}
