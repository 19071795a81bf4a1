use std::path::PathBuf;

use axum::extract::{Multipart, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use common::car::CarError;

use crate::http_server::problem::internal_error;
use crate::ServiceState;

/// Name of the multipart field carrying the archive
pub const CAR_FIELD: &str = "car";

#[derive(Debug, Clone, clap::Args)]
pub struct ImportRequest {
    /// CARv1 archive to import
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportResponse {
    pub roots: Vec<String>,
    pub imported: usize,
}

/// Import the blocks of an archive. The upload is read before the
///  bucket gate is taken; the blocks are written with it held so
///  reclamation never sweeps concurrently. Imported content is not
///  pinned and does not touch the bucket.
#[tracing::instrument(skip_all)]
pub async fn handler(
    State(state): State<ServiceState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ImportError> {
    let mut archive: Option<Bytes> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ImportError::Multipart(e.to_string()))?
    {
        let field_name = field.name().unwrap_or("").to_string();
        if field_name == CAR_FIELD {
            archive = Some(
                field
                    .bytes()
                    .await
                    .map_err(|e| ImportError::Multipart(e.to_string()))?,
            );
        } else {
            tracing::warn!("Ignoring unknown field: {}", field_name);
        }
    }

    let archive = archive.ok_or(ImportError::MissingArchive)?;
    let import = state
        .gate()
        .run_exclusive(state.store().import_car(&archive))
        .await?;
    tracing::info!(
        blocks = import.blocks,
        roots = import.roots.len(),
        "archive imported"
    );

    Ok((
        http::StatusCode::OK,
        Json(ImportResponse {
            roots: import.roots.iter().map(|cid| cid.to_string()).collect(),
            imported: import.blocks,
        }),
    )
        .into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("Multipart error: {0}")]
    Multipart(String),
    #[error("multipart field 'car' is required")]
    MissingArchive,
    #[error(transparent)]
    Car(#[from] CarError),
}

impl IntoResponse for ImportError {
    fn into_response(self) -> Response {
        match self {
            ImportError::Car(CarError::Blockstore(e)) => internal_error(&e),
            _ => (
                http::StatusCode::BAD_REQUEST,
                format!("Bad request: {}", self),
            )
                .into_response(),
        }
    }
}
