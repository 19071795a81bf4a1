use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use common::bucket::RemoveError as BucketRemoveError;
use common::linked_data::CidError;

use crate::http_server::api::client::{ApiError, ApiRequest};
use crate::http_server::problem::{internal_error, parse_identifier, Problem};
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize, clap::Args)]
pub struct RemoveRequest {
    /// Identifier of the item to remove
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveResponse {
    pub new_root_id: String,
}

#[tracing::instrument(skip(state))]
pub async fn handler(
    State(state): State<ServiceState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, RemoveError> {
    let item = parse_identifier(&id)?;
    let removed = state.bucket().remove(&item).await?;

    Ok((
        http::StatusCode::OK,
        Json(RemoveResponse {
            new_root_id: removed.root.to_string(),
        }),
    )
        .into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum RemoveError {
    #[error(transparent)]
    InvalidIdentifier(#[from] CidError),
    #[error(transparent)]
    Bucket(#[from] BucketRemoveError),
}

impl IntoResponse for RemoveError {
    fn into_response(self) -> Response {
        match self {
            RemoveError::InvalidIdentifier(e) => Problem::invalid_identifier(&e).into_response(),
            RemoveError::Bucket(BucketRemoveError::ItemNotFound(item)) => {
                Problem::item_does_not_exist(&item).into_response()
            }
            RemoveError::Bucket(BucketRemoveError::Bucket(e)) => internal_error(&e),
        }
    }
}

impl ApiRequest for RemoveRequest {
    type Response = RemoveResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = base_url.join(&format!("/remove/{}", self.id))?;
        Ok(client.post(full_url))
    }
}
