use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, HeaderName, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};

use common::blockstore::BlockstoreError;
use common::linked_data::{Cid, CidError};
use common::unixfs::{Stat, UnixfsError};

use crate::http_server::problem::{internal_error, parse_identifier};
use crate::ServiceState;

const OCTET_STREAM: &str = "application/octet-stream";
const CACHE_CONTROL_IMMUTABLE: &str = "public, max-age=29030400, immutable";
const X_IPFS_PATH: HeaderName = HeaderName::from_static("x-ipfs-path");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    pub name: String,
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryListing {
    pub id: String,
    pub entries: Vec<DirectoryEntry>,
}

/// Serve any object held by the store, bucket member or not
#[tracing::instrument(skip(state))]
pub async fn handler(
    State(state): State<ServiceState>,
    Path(id): Path<String>,
) -> Result<Response, GatewayError> {
    let cid = parse_identifier(&id)?;
    let store = state.store();
    if !store.blocks().has(&cid).await? {
        return Err(GatewayError::NotHosted(cid));
    }

    let fs = store.unixfs();
    match fs.stat_object(&cid).await {
        Ok(Stat::File { size }) => {
            let mut content = fs.cat(&cid).await?;
            // the type is sniffed from the first chunk, which goes out first
            let head = content.next().await.transpose()?;
            let content_type = sniff_content_type(head.as_deref());
            let body = stream::iter(head.map(Ok)).chain(content);
            Ok(content_response(
                &cid,
                size,
                content_type,
                Body::from_stream(body),
            ))
        }
        Ok(Stat::Directory { .. }) => {
            let entries = fs
                .ls(&cid)
                .await?
                .into_iter()
                .map(|entry| DirectoryEntry {
                    name: entry.name,
                    id: entry.cid.to_string(),
                })
                .collect();
            let listing = DirectoryListing {
                id: cid.to_string(),
                entries,
            };
            Ok((immutable_headers(&cid), Json(listing)).into_response())
        }
        // a block we can't interpret (e.g. imported from an archive)
        Err(UnixfsError::Codec(e)) => {
            tracing::debug!(%cid, error = %e, "serving undecodable block as raw bytes");
            let data = store.blocks().get(&cid).await?;
            let content_type = sniff_content_type(Some(data.as_ref()));
            Ok(content_response(
                &cid,
                data.len() as u64,
                content_type,
                Body::from(data),
            ))
        }
        Err(e) => Err(e.into()),
    }
}

fn immutable_headers(cid: &Cid) -> [(HeaderName, String); 3] {
    [
        (header::ETAG, format!("\"{}\"", cid)),
        (header::CACHE_CONTROL, CACHE_CONTROL_IMMUTABLE.to_string()),
        (X_IPFS_PATH, format!("/ipfs/{}", cid)),
    ]
}

/// Guess a MIME type from the leading bytes of some content
fn sniff_content_type(head: Option<&[u8]>) -> &'static str {
    head.and_then(infer::get)
        .map(|kind| kind.mime_type())
        .unwrap_or(OCTET_STREAM)
}

fn content_response(cid: &Cid, size: u64, content_type: &str, body: Body) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (header::CONTENT_LENGTH, size.to_string()),
        ],
        immutable_headers(cid),
        body,
    )
        .into_response()
}

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error(transparent)]
    InvalidIdentifier(#[from] CidError),
    #[error("content not hosted: {0}")]
    NotHosted(Cid),
    #[error(transparent)]
    Blockstore(#[from] BlockstoreError),
    #[error(transparent)]
    Unixfs(#[from] UnixfsError),
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        match self {
            GatewayError::InvalidIdentifier(e) => {
                (StatusCode::BAD_REQUEST, format!("Bad request: {}", e)).into_response()
            }
            GatewayError::NotHosted(_) | GatewayError::Blockstore(BlockstoreError::NotFound(_)) => {
                (StatusCode::NOT_FOUND, "Content not hosted").into_response()
            }
            GatewayError::Blockstore(e) => internal_error(&e),
            GatewayError::Unixfs(e) => internal_error(&e),
        }
    }
}
