use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use common::bucket::BucketError;
use common::linked_data::CidError;

use crate::http_server::api::client::{ApiError, ApiRequest};
use crate::http_server::problem::{internal_error, parse_identifier, Problem};
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize, clap::Args)]
pub struct SetRootRequest {
    /// Identifier of the directory to use as the bucket root.
    ///  Not validated: a non-directory breaks the bucket until
    ///  the next override.
    pub id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetRootResponse {}

#[tracing::instrument(skip(state))]
pub async fn handler(
    State(state): State<ServiceState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, SetRootError> {
    let root = parse_identifier(&id)?;
    tracing::warn!(%root, "overriding bucket root");
    state.bucket().set_root(&root).await?;

    Ok((http::StatusCode::OK, Json(SetRootResponse {})).into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum SetRootError {
    #[error(transparent)]
    InvalidIdentifier(#[from] CidError),
    #[error(transparent)]
    Bucket(#[from] BucketError),
}

impl IntoResponse for SetRootError {
    fn into_response(self) -> Response {
        match self {
            SetRootError::InvalidIdentifier(e) => Problem::invalid_identifier(&e).into_response(),
            SetRootError::Bucket(e) => internal_error(&e),
        }
    }
}

impl ApiRequest for SetRootRequest {
    type Response = SetRootResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = base_url.join(&format!("/set-bucket-root/{}", self.id))?;
        Ok(client.post(full_url))
    }
}
