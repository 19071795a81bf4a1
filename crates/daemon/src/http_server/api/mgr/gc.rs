use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use common::gate::GateError;
use common::gc::GcError as CollectError;

use crate::http_server::api::client::{ApiError, ApiRequest};
use crate::http_server::problem::internal_error;
use crate::ServiceState;

#[derive(Debug, Clone, Default, Serialize, Deserialize, clap::Args)]
pub struct GcRequest {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GcResponse {
    pub deleted_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

/// Reclaim unpinned blocks. Runs with the bucket gate held so no
///  mutation can write blocks that are not yet pinned; gives up if
///  the gate is not free within the configured timeout.
#[tracing::instrument(skip_all)]
pub async fn handler(State(state): State<ServiceState>) -> Result<Response, GcError> {
    let _guard = state.gate().acquire_timeout(state.gc_lock_timeout()).await?;

    let report = state.store().gc().await?;
    tracing::info!(
        deleted = report.deleted.len(),
        errors = report.errors.len(),
        "reclamation finished"
    );

    let status = if report.is_clean() {
        http::StatusCode::OK
    } else {
        http::StatusCode::INTERNAL_SERVER_ERROR
    };
    let response = GcResponse {
        deleted_ids: report.deleted.iter().map(|cid| cid.to_string()).collect(),
        errors: report.errors,
    };

    Ok((status, Json(response)).into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum GcError {
    #[error(transparent)]
    Busy(#[from] GateError),
    #[error(transparent)]
    Collect(#[from] CollectError),
}

impl IntoResponse for GcError {
    fn into_response(self) -> Response {
        match self {
            GcError::Busy(e) => {
                tracing::warn!("{}", e);
                (
                    http::StatusCode::SERVICE_UNAVAILABLE,
                    "bucket is busy, try again later",
                )
                    .into_response()
            }
            GcError::Collect(e) => internal_error(&e),
        }
    }
}

impl ApiRequest for GcRequest {
    type Response = GcResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = base_url.join("/mgr/gc")?;
        Ok(client.post(full_url))
    }
}
