use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use common::bucket::BucketError;

use crate::http_server::api::client::{ApiError, ApiRequest};
use crate::http_server::problem::internal_error;
use crate::ServiceState;

#[derive(Debug, Clone, Default, Serialize, Deserialize, clap::Args)]
pub struct ListRequest {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse {
    pub root_id: String,
    pub item_ids: Vec<String>,
}

pub async fn handler(State(state): State<ServiceState>) -> Result<impl IntoResponse, ListError> {
    let listing = state.bucket().list().await?;

    Ok((
        http::StatusCode::OK,
        Json(ListResponse {
            root_id: listing.root.to_string(),
            item_ids: listing.items.iter().map(|item| item.to_string()).collect(),
        }),
    )
        .into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum ListError {
    #[error(transparent)]
    Bucket(#[from] BucketError),
}

impl IntoResponse for ListError {
    fn into_response(self) -> Response {
        match self {
            ListError::Bucket(e) => internal_error(&e),
        }
    }
}

impl ApiRequest for ListRequest {
    type Response = ListResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = base_url.join("/list")?;
        Ok(client.get(full_url))
    }
}
