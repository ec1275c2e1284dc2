//! Response value returned by the auth operations.

use axum::{
    Json,
    http::{StatusCode, header::SET_COOKIE},
    response::{AppendHeaders, IntoResponse, Response},
};
use serde_json::Value;

/// Status, JSON body and `Set-Cookie` values produced by an auth operation.
/// Converted into an HTTP response only at the handler boundary.
#[derive(Debug, Clone)]
pub struct AuthReply {
    status: StatusCode,
    body: Value,
    cookies: Vec<String>,
}

impl AuthReply {
    pub fn new(status: StatusCode, body: Value) -> Self {
        Self {
            status,
            body,
            cookies: Vec::new(),
        }
    }

    pub fn ok(body: Value) -> Self {
        Self::new(StatusCode::OK, body)
    }

    pub fn with_cookie(mut self, cookie: String) -> Self {
        self.cookies.push(cookie);
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn body(&self) -> &Value {
        &self.body
    }

    pub fn cookies(&self) -> &[String] {
        &self.cookies
    }
}

impl IntoResponse for AuthReply {
    fn into_response(self) -> Response {
        let headers: Vec<_> = self
            .cookies
            .into_iter()
            .map(|cookie| (SET_COOKIE, cookie))
            .collect();

        (self.status, AppendHeaders(headers), Json(self.body)).into_response()
    }
}
