//! Import of CARv1 archives into the blockstore.
//!
//! An archive is a varint-prefixed DAG-CBOR header followed by
//! varint-prefixed sections, each a binary CID and the block it
//! names. Every block is hash-verified before it is stored.

use std::io::Cursor;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::blockstore::{Blockstore, BlockstoreError};
use crate::linked_data::{verify_block, Cid, CodecError};

#[derive(Debug, thiserror::Error)]
pub enum CarError {
    #[error("archive truncated at byte {0}")]
    Truncated(usize),
    #[error("malformed varint at byte {0}")]
    Varint(usize),
    #[error("invalid archive header: {0}")]
    Header(String),
    #[error("unsupported archive version {0}")]
    UnsupportedVersion(u64),
    #[error("invalid block identifier at byte {0}: {1}")]
    Cid(usize, String),
    #[error("invalid block: {0}")]
    Codec(#[from] CodecError),
    #[error("blockstore error: {0}")]
    Blockstore(#[from] BlockstoreError),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarHeader {
    pub version: u64,
    pub roots: Vec<Cid>,
}

/// Summary of an import
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarImport {
    pub roots: Vec<Cid>,
    pub blocks: usize,
}

/// Read an unsigned LEB128 varint from the start of `data`,
///  returning the value and the number of bytes consumed
fn read_varint(data: &[u8], at: usize) -> Result<(u64, usize), CarError> {
    let mut value: u64 = 0;
    for (i, byte) in data.iter().enumerate().take(10) {
        value |= u64::from(byte & 0x7f) << (7 * i);
        if byte & 0x80 == 0 {
            return Ok((value, i + 1));
        }
    }
    if data.len() < 10 {
        Err(CarError::Truncated(at + data.len()))
    } else {
        Err(CarError::Varint(at))
    }
}

/// Take one varint-prefixed section starting at `pos`
fn read_section(data: &[u8], pos: usize) -> Result<(&[u8], usize), CarError> {
    let (len, prefix) = read_varint(&data[pos..], pos)?;
    let start = pos + prefix;
    let end = usize::try_from(len)
        .ok()
        .and_then(|len| start.checked_add(len))
        .filter(|end| *end <= data.len())
        .ok_or(CarError::Truncated(data.len()))?;
    Ok((&data[start..end], end))
}

/// Parse only the header of an archive
pub fn read_header(data: &[u8]) -> Result<(CarHeader, usize), CarError> {
    if data.is_empty() {
        return Err(CarError::Truncated(0));
    }
    let (header, next) = read_section(data, 0)?;
    let header: CarHeader =
        serde_ipld_dagcbor::from_slice(header).map_err(|e| CarError::Header(e.to_string()))?;
    if header.version != 1 {
        return Err(CarError::UnsupportedVersion(header.version));
    }
    Ok((header, next))
}

/// Verify and store every block of the archive. Nothing is
///  pinned; imported content is reclaimable until something
///  links or pins it.
pub async fn import_car(blocks: &dyn Blockstore, data: &[u8]) -> Result<CarImport, CarError> {
    let (header, mut pos) = read_header(data)?;

    // verify everything before storing anything
    let mut parsed = Vec::new();
    while pos < data.len() {
        let (section, next) = read_section(data, pos)?;
        let mut cursor = Cursor::new(section);
        let cid = Cid::read_bytes(&mut cursor).map_err(|e| CarError::Cid(pos, e.to_string()))?;
        let block = &section[cursor.position() as usize..];
        verify_block(&cid, block)?;
        parsed.push((cid, Bytes::copy_from_slice(block)));
        pos = next;
    }

    let count = parsed.len();
    for (cid, block) in parsed {
        blocks.put(&cid, block).await?;
    }
    tracing::info!(roots = header.roots.len(), blocks = count, "imported archive");

    Ok(CarImport {
        roots: header.roots,
        blocks: count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockstore::MemoryBlockstore;
    use crate::linked_data::{cid_for, DagNode, Directory, RAW};

    fn write_varint(mut value: u64, out: &mut Vec<u8>) {
        loop {
            let byte = (value & 0x7f) as u8;
            value >>= 7;
            if value == 0 {
                out.push(byte);
                return;
            }
            out.push(byte | 0x80);
        }
    }

    fn write_car(roots: Vec<Cid>, blocks: &[(Cid, Vec<u8>)]) -> Vec<u8> {
        let header = serde_ipld_dagcbor::to_vec(&CarHeader { version: 1, roots }).unwrap();
        let mut out = Vec::new();
        write_varint(header.len() as u64, &mut out);
        out.extend_from_slice(&header);
        for (cid, block) in blocks {
            let cid = cid.to_bytes();
            write_varint((cid.len() + block.len()) as u64, &mut out);
            out.extend_from_slice(&cid);
            out.extend_from_slice(block);
        }
        out
    }

    #[test]
    fn test_read_varint() {
        assert_eq!(read_varint(&[0x00], 0).unwrap(), (0, 1));
        assert_eq!(read_varint(&[0x7f], 0).unwrap(), (127, 1));
        assert_eq!(read_varint(&[0x80, 0x01], 0).unwrap(), (128, 2));
        assert_eq!(read_varint(&[0xac, 0x02, 0xff], 0).unwrap(), (300, 2));
        assert!(matches!(read_varint(&[0x80], 3), Err(CarError::Truncated(4))));
        assert!(matches!(read_varint(&[0xff; 11], 0), Err(CarError::Varint(0))));
    }

    #[tokio::test]
    async fn test_import() {
        let leaf = b"leaf".to_vec();
        let leaf_cid = cid_for(RAW, &leaf);
        let mut dir = Directory::new();
        dir.insert("leaf".into(), leaf_cid);
        let (dir_cid, dir_block) = DagNode::Directory(dir).to_block().unwrap();

        let car = write_car(
            vec![dir_cid],
            &[(dir_cid, dir_block), (leaf_cid, leaf.clone())],
        );
        let store = MemoryBlockstore::new();
        let imported = import_car(&store, &car).await.unwrap();

        assert_eq!(imported.roots, vec![dir_cid]);
        assert_eq!(imported.blocks, 2);
        assert_eq!(store.get(&leaf_cid).await.unwrap().as_ref(), leaf.as_slice());
        assert!(store.has(&dir_cid).await.unwrap());
    }

    #[tokio::test]
    async fn test_import_rejects_tampered_block() {
        let good = cid_for(RAW, b"good");
        let car = write_car(vec![good], &[(good, b"evil".to_vec())]);
        let store = MemoryBlockstore::new();

        assert!(matches!(
            import_car(&store, &car).await,
            Err(CarError::Codec(CodecError::HashMismatch(_)))
        ));
        assert!(store.cids().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_import_rejects_bad_archives() {
        let store = MemoryBlockstore::new();
        assert!(matches!(
            import_car(&store, &[]).await,
            Err(CarError::Truncated(0))
        ));

        let mut car = write_car(vec![], &[(cid_for(RAW, b"x"), b"x".to_vec())]);
        car.truncate(car.len() - 1);
        assert!(matches!(
            import_car(&store, &car).await,
            Err(CarError::Truncated(_))
        ));

        let header = serde_ipld_dagcbor::to_vec(&CarHeader {
            version: 2,
            roots: vec![],
        })
        .unwrap();
        let mut car = Vec::new();
        write_varint(header.len() as u64, &mut car);
        car.extend_from_slice(&header);
        assert!(matches!(
            import_car(&store, &car).await,
            Err(CarError::UnsupportedVersion(2))
        ));
    }
}
