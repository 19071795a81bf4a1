//! Shared helpers for driving the daemon router in tests
#![allow(dead_code)]

use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, Response};
use axum::Router;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use ::common::store::Store;
use ipss_daemon::http_server::{router, BasicAuth};
use ipss_daemon::ServiceState;
use tower::ServiceExt;

pub const USER: &str = "user";
pub const PASSWORD: &str = "password";
pub const GC_LOCK_TIMEOUT: Duration = Duration::from_millis(80);

const BOUNDARY: &str = "ipss-test-boundary";

/// Service state over in-memory stores with the default credentials
pub fn setup_state() -> ServiceState {
    ServiceState::new(
        Store::memory(),
        BasicAuth::new(USER, PASSWORD),
        GC_LOCK_TIMEOUT,
    )
}

pub fn setup_router(state: &ServiceState) -> Router {
    router(state.clone(), tracing::Level::DEBUG)
}

pub fn auth_header() -> String {
    format!("Basic {}", STANDARD.encode(format!("{}:{}", USER, PASSWORD)))
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header(header::AUTHORIZATION, auth_header())
        .body(Body::empty())
        .unwrap()
}

pub fn post(uri: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::AUTHORIZATION, auth_header())
        .body(Body::empty())
        .unwrap()
}

/// A single-field multipart upload
pub fn upload(uri: &str, field: &str, data: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"blob\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::AUTHORIZATION, auth_header())
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

pub async fn send(router: &Router, request: Request<Body>) -> Response<Body> {
    router.clone().oneshot(request).await.unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
