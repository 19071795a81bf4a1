use std::path::PathBuf;

use axum::extract::{Multipart, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use common::bucket::AddError as BucketAddError;

use crate::http_server::problem::{internal_error, Problem};
use crate::ServiceState;

/// Name of the multipart field carrying the item
pub const FILE_FIELD: &str = "file";

#[derive(Debug, Clone, clap::Args)]
pub struct AddRequest {
    /// File whose bytes become the new item
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddResponse {
    pub item_id: String,
    pub new_root_id: String,
}

#[tracing::instrument(skip_all)]
pub async fn handler(
    State(state): State<ServiceState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AddError> {
    let mut data: Option<Bytes> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::warn!("Multipart parsing error: {}", e);
        AddError::Multipart(e.to_string())
    })? {
        let field_name = field.name().unwrap_or("").to_string();
        if field_name == FILE_FIELD {
            data = Some(
                field
                    .bytes()
                    .await
                    .map_err(|e| AddError::Multipart(e.to_string()))?,
            );
        } else {
            tracing::warn!("Ignoring unknown field: {}", field_name);
        }
    }

    let data = data.ok_or(AddError::MissingFile)?;
    tracing::info!(size = data.len(), "adding item");
    let added = state.bucket().add(data).await?;

    Ok((
        http::StatusCode::OK,
        Json(AddResponse {
            item_id: added.item.to_string(),
            new_root_id: added.root.to_string(),
        }),
    )
        .into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum AddError {
    #[error("Multipart error: {0}")]
    Multipart(String),
    #[error("multipart field 'file' is required")]
    MissingFile,
    #[error(transparent)]
    Bucket(#[from] BucketAddError),
}

impl IntoResponse for AddError {
    fn into_response(self) -> Response {
        match self {
            AddError::Multipart(_) | AddError::MissingFile => (
                http::StatusCode::BAD_REQUEST,
                format!("Bad request: {}", self),
            )
                .into_response(),
            AddError::Bucket(BucketAddError::ContentAlreadyExists(item)) => {
                Problem::content_already_exists(&item).into_response()
            }
            AddError::Bucket(BucketAddError::Bucket(e)) => internal_error(&e),
        }
    }
}
