use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use common::linked_data::{parse_cid, Cid, CidError};

pub const PROBLEM_CONTENT_TYPE: &str = "application/problem+json";

/// A problem details body for the expected failures
///  callers are meant to react to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Problem {
    pub status: u16,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Problem {
    pub fn content_already_exists(item: &Cid) -> Self {
        Self {
            status: StatusCode::CONFLICT.as_u16(),
            kind: "content-already-exists".to_string(),
            item_id: Some(item.to_string()),
            error: None,
        }
    }

    pub fn item_does_not_exist(item: &Cid) -> Self {
        Self {
            status: StatusCode::NOT_FOUND.as_u16(),
            kind: "item-does-not-exist".to_string(),
            item_id: Some(item.to_string()),
            error: None,
        }
    }

    pub fn invalid_identifier(err: &CidError) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED.as_u16(),
            kind: "invalid-identifier".to_string(),
            item_id: None,
            error: Some(err.to_string()),
        }
    }
}

impl IntoResponse for Problem {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (
            status,
            [(header::CONTENT_TYPE, PROBLEM_CONTENT_TYPE)],
            Json(self),
        )
            .into_response()
    }
}

/// Parse an identifier taken from a request path. Nothing
///  touches the store before this succeeds.
pub fn parse_identifier(raw: &str) -> Result<Cid, CidError> {
    parse_cid(raw).inspect_err(|e| tracing::debug!(error = %e, "rejected identifier"))
}

/// The opaque body returned for unexpected failures
pub fn internal_error(err: &dyn std::error::Error) -> Response {
    tracing::error!(error = %err, "request failed");
    (StatusCode::INTERNAL_SERVER_ERROR, "Unexpected error").into_response()
}
