use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use common::linked_data::CidError;
use common::pins::PinError;

use crate::http_server::api::client::{ApiError, ApiRequest};
use crate::http_server::problem::{internal_error, parse_identifier, Problem};
use crate::ServiceState;

#[derive(Debug, Clone, Default, Serialize, Deserialize, clap::Args)]
pub struct PinsLsRequest {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinInfo {
    pub id: String,
    pub tag: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinsLsResponse {
    pub pins: Vec<PinInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize, clap::Args)]
pub struct PinsRmRequest {
    /// Identifier to unpin
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PinsRmResponse {
    pub unpinned_ids: Vec<String>,
}

/// Every pin, read with the bucket gate held so a root swap is
///  never seen halfway
pub async fn ls_handler(State(state): State<ServiceState>) -> Result<impl IntoResponse, PinsError> {
    let pins = state
        .gate()
        .run_exclusive(state.store().pins().ls())
        .await?;

    Ok((
        http::StatusCode::OK,
        Json(PinsLsResponse {
            pins: pins
                .into_iter()
                .map(|pin| PinInfo {
                    id: pin.cid.to_string(),
                    tag: pin.tag,
                })
                .collect(),
        }),
    )
        .into_response())
}

/// Drop a pin by hand, inside the bucket gate. Unpinning the current
///  bucket root or one of its items exposes it to the next
///  reclamation run.
#[tracing::instrument(skip(state))]
pub async fn rm_handler(
    State(state): State<ServiceState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, PinsError> {
    let cid = parse_identifier(&id)?;
    let unpinned = state
        .gate()
        .run_exclusive(state.store().pins().rm(&cid))
        .await?;
    if unpinned.is_empty() {
        tracing::debug!(%cid, "nothing to unpin");
    }

    Ok((
        http::StatusCode::OK,
        Json(PinsRmResponse {
            unpinned_ids: unpinned.iter().map(|cid| cid.to_string()).collect(),
        }),
    )
        .into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum PinsError {
    #[error(transparent)]
    InvalidIdentifier(#[from] CidError),
    #[error(transparent)]
    Pin(#[from] PinError),
}

impl IntoResponse for PinsError {
    fn into_response(self) -> Response {
        match self {
            PinsError::InvalidIdentifier(e) => Problem::invalid_identifier(&e).into_response(),
            PinsError::Pin(e) => internal_error(&e),
        }
    }
}

impl ApiRequest for PinsLsRequest {
    type Response = PinsLsResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = base_url.join("/mgr/pins/ls")?;
        Ok(client.post(full_url))
    }
}

impl ApiRequest for PinsRmRequest {
    type Response = PinsRmResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = base_url.join(&format!("/mgr/pins/rm/{}", self.id))?;
        Ok(client.post(full_url))
    }
}
