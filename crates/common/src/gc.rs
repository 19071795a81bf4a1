//! Mark-and-sweep reclamation of unpinned blocks.

use std::collections::HashSet;

use crate::blockstore::BlockstoreError;
use crate::linked_data::Cid;
use crate::pins::{PinError, Pins};
use crate::unixfs::{Unixfs, UnixfsError};

#[derive(Debug, thiserror::Error)]
pub enum GcError {
    #[error("blockstore error: {0}")]
    Blockstore(#[from] BlockstoreError),
    #[error("pin error: {0}")]
    Pin(#[from] PinError),
    #[error("unixfs error: {0}")]
    Unixfs(#[from] UnixfsError),
}

/// Outcome of a collection run. Failing to delete a single
///  block does not abort the run; the failure is reported
///  alongside what was deleted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GcReport {
    pub deleted: Vec<Cid>,
    pub errors: Vec<String>,
}

impl GcReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Delete every block not reachable from a pin
pub async fn collect_garbage(fs: &Unixfs, pins: &Pins) -> Result<GcReport, GcError> {
    let blocks = fs.blocks();
    let live = mark(fs, pins).await?;
    tracing::debug!(live = live.len(), "gc mark finished");

    let mut report = GcReport::default();
    for cid in blocks.cids().await? {
        if live.contains(&cid) {
            continue;
        }
        match blocks.delete(&cid).await {
            Ok(()) => report.deleted.push(cid),
            Err(e) => {
                tracing::warn!(%cid, error = %e, "gc failed to delete block");
                report.errors.push(format!("{}: {}", cid, e));
            }
        }
    }

    tracing::info!(
        deleted = report.deleted.len(),
        errors = report.errors.len(),
        "gc finished"
    );
    Ok(report)
}

async fn mark(fs: &Unixfs, pins: &Pins) -> Result<HashSet<Cid>, GcError> {
    let mut live = HashSet::new();
    let mut stack: Vec<Cid> = pins.ls().await?.into_iter().map(|pin| pin.cid).collect();

    while let Some(cid) = stack.pop() {
        if !live.insert(cid) {
            continue;
        }
        match fs.links(&cid).await {
            Ok(links) => stack.extend(links),
            // pinned but not held locally, nothing below it to keep
            Err(UnixfsError::NotFound(_)) => {}
            Err(UnixfsError::Codec(e)) => {
                tracing::warn!(%cid, error = %e, "gc treating undecodable block as a leaf")
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(live)
}
