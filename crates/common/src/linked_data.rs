//! Content identifiers and the node formats we store behind them.
//!
//! Every object in the store is addressed by a CIDv1 carrying a SHA2-256
//! multihash. Leaves are stored with the `raw` codec; structural nodes
//! (directories and chunked files) are DAG-CBOR encoded [`DagNode`]s.

use std::collections::BTreeMap;
use std::str::FromStr;

use ipld_core::ipld::Ipld;
use multihash::Multihash;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

pub use cid::Cid;

/// Multicodec for raw leaf blocks
pub const RAW: u64 = 0x55;
/// Multicodec for DAG-CBOR nodes
pub const DAG_CBOR: u64 = 0x71;
/// Multihash code for SHA2-256
pub const SHA2_256: u64 = 0x12;

#[derive(Debug, thiserror::Error)]
#[error("invalid content identifier '{input}': {reason}")]
pub struct CidError {
    pub input: String,
    pub reason: String,
}

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("failed to encode node: {0}")]
    Encode(String),
    #[error("failed to decode node: {0}")]
    Decode(String),
    #[error("unsupported multihash code: {0:#x}")]
    UnsupportedHash(u64),
    #[error("block does not match its content identifier {0}")]
    HashMismatch(Cid),
}

/// Parse a content identifier from its string form
pub fn parse_cid(input: &str) -> Result<Cid, CidError> {
    Cid::from_str(input).map_err(|e| CidError {
        input: input.to_string(),
        reason: e.to_string(),
    })
}

/// Compute the CIDv1 of `data` under the given codec
pub fn cid_for(codec: u64, data: &[u8]) -> Cid {
    let digest = Sha256::digest(data);
    // a 32 byte digest always fits the 64 byte multihash
    let hash = Multihash::<64>::wrap(SHA2_256, &digest).expect("sha2-256 digest exceeds multihash");
    Cid::new_v1(codec, hash)
}

/// Check that `data` hashes to `cid`
pub fn verify_block(cid: &Cid, data: &[u8]) -> Result<(), CodecError> {
    let code = cid.hash().code();
    if code != SHA2_256 {
        return Err(CodecError::UnsupportedHash(code));
    }
    if cid_for(cid.codec(), data).hash() != cid.hash() {
        return Err(CodecError::HashMismatch(*cid));
    }
    Ok(())
}

/// Collect the links held by an encoded block.
///  Raw blocks never link anywhere; DAG-CBOR blocks
///  are walked generically so that imported DAGs
///  are followed as well as our own nodes.
pub fn block_links(cid: &Cid, data: &[u8]) -> Result<Vec<Cid>, CodecError> {
    if cid.codec() != DAG_CBOR {
        return Ok(Vec::new());
    }
    let ipld: Ipld =
        serde_ipld_dagcbor::from_slice(data).map_err(|e| CodecError::Decode(e.to_string()))?;
    let mut links = Vec::new();
    collect_links(&ipld, &mut links);
    Ok(links)
}

fn collect_links(ipld: &Ipld, links: &mut Vec<Cid>) {
    match ipld {
        Ipld::Link(cid) => links.push(*cid),
        Ipld::List(items) => items.iter().for_each(|item| collect_links(item, links)),
        Ipld::Map(map) => map.values().for_each(|value| collect_links(value, links)),
        _ => {}
    }
}

/// A directory: entry names mapped to the
///  content they point at
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Directory {
    entries: BTreeMap<String, Cid>,
}

impl Directory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Cid> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn insert(&mut self, name: String, cid: Cid) -> Option<Cid> {
        self.entries.insert(name, cid)
    }

    pub fn remove(&mut self, name: &str) -> Option<Cid> {
        self.entries.remove(name)
    }

    /// Entries in enumeration (name) order
    pub fn entries(&self) -> impl Iterator<Item = (&String, &Cid)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A file too large for a single leaf, split
///  into fixed-size raw chunks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileNode {
    pub size: u64,
    pub chunks: Vec<Cid>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DagNode {
    Directory(Directory),
    File(FileNode),
}

impl DagNode {
    pub fn encode(&self) -> Result<Vec<u8>, CodecError> {
        serde_ipld_dagcbor::to_vec(self).map_err(|e| CodecError::Encode(e.to_string()))
    }

    pub fn decode(data: &[u8]) -> Result<Self, CodecError> {
        serde_ipld_dagcbor::from_slice(data).map_err(|e| CodecError::Decode(e.to_string()))
    }

    /// Encode the node and compute its identifier
    pub fn to_block(&self) -> Result<(Cid, Vec<u8>), CodecError> {
        let data = self.encode()?;
        Ok((cid_for(DAG_CBOR, &data), data))
    }
}
