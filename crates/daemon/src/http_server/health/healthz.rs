use axum::http::StatusCode;
use axum::response::IntoResponse;

/// Liveness: the process is up and serving requests
pub async fn handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
