//! File and directory operations over a [`Blockstore`].
//!
//! Every operation is copy-on-write: mutating a directory
//! never touches the existing node, it writes a new one and
//! returns its identifier.

use std::sync::Arc;

use bytes::Bytes;
use futures::stream::{self, BoxStream, StreamExt};

use crate::blockstore::{Blockstore, BlockstoreError};
use crate::linked_data::{
    block_links, cid_for, Cid, CodecError, DagNode, Directory, FileNode, DAG_CBOR, RAW,
};

/// Default fixed chunk size for file content
pub const DEFAULT_CHUNK_SIZE: usize = 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum UnixfsError {
    #[error("blockstore error: {0}")]
    Blockstore(#[from] BlockstoreError),
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
    /// The named entry does not exist, or the
    ///  object itself is not held by the store
    #[error("not found: {0}")]
    NotFound(String),
    #[error("not a directory: {0}")]
    NotADirectory(Cid),
    #[error("not a file: {0}")]
    NotAFile(Cid),
    #[error("entry already exists: {0}")]
    AlreadyExists(String),
}

/// What a content identifier resolves to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stat {
    File { size: u64 },
    Directory { entries: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub cid: Cid,
}

#[derive(Debug, Clone)]
pub struct Unixfs {
    blocks: Arc<dyn Blockstore>,
    chunk_size: usize,
}

impl Unixfs {
    pub fn new(blocks: Arc<dyn Blockstore>, chunk_size: usize) -> Self {
        Self {
            blocks,
            chunk_size: chunk_size.max(1),
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn blocks(&self) -> &Arc<dyn Blockstore> {
        &self.blocks
    }

    /// Store `data` as a file. Content that fits in a single
    ///  chunk becomes one raw block; anything larger is split
    ///  into raw chunks under a file node.
    pub async fn add_bytes(&self, data: Bytes) -> Result<Cid, UnixfsError> {
        if data.len() <= self.chunk_size {
            return self.put_raw(data).await;
        }

        let mut chunks = Vec::with_capacity(data.len().div_ceil(self.chunk_size));
        let mut offset = 0;
        while offset < data.len() {
            let end = (offset + self.chunk_size).min(data.len());
            chunks.push(self.put_raw(data.slice(offset..end)).await?);
            offset = end;
        }

        let node = DagNode::File(FileNode {
            size: data.len() as u64,
            chunks,
        });
        self.put_node(&node).await
    }

    /// Store an empty directory
    pub async fn add_directory(&self) -> Result<Cid, UnixfsError> {
        self.put_node(&DagNode::Directory(Directory::new())).await
    }

    /// Resolve the entry `name` directly below the directory `dir`
    pub async fn stat(&self, dir: &Cid, name: &str) -> Result<Cid, UnixfsError> {
        let directory = self.load_directory(dir).await?;
        directory
            .get(name)
            .copied()
            .ok_or_else(|| UnixfsError::NotFound(format!("{}/{}", dir, name)))
    }

    /// Describe the object at `cid`
    pub async fn stat_object(&self, cid: &Cid) -> Result<Stat, UnixfsError> {
        let data = self.get_block(cid).await?;
        if cid.codec() == RAW {
            return Ok(Stat::File {
                size: data.len() as u64,
            });
        }
        match DagNode::decode(&data)? {
            DagNode::File(file) => Ok(Stat::File { size: file.size }),
            DagNode::Directory(dir) => Ok(Stat::Directory {
                entries: dir.len(),
            }),
        }
    }

    /// Link `source` into `dir` under `name`, returning the new directory
    pub async fn cp(&self, source: &Cid, dir: &Cid, name: &str) -> Result<Cid, UnixfsError> {
        if !self.blocks.has(source).await? {
            return Err(UnixfsError::NotFound(source.to_string()));
        }
        let mut directory = self.load_directory(dir).await?;
        if directory.contains(name) {
            return Err(UnixfsError::AlreadyExists(format!("{}/{}", dir, name)));
        }
        directory.insert(name.to_string(), *source);
        self.put_node(&DagNode::Directory(directory)).await
    }

    /// Drop the entry `name` from `dir`, returning the new directory.
    ///  The content the entry pointed at is left untouched.
    pub async fn rm(&self, dir: &Cid, name: &str) -> Result<Cid, UnixfsError> {
        let mut directory = self.load_directory(dir).await?;
        if directory.remove(name).is_none() {
            return Err(UnixfsError::NotFound(format!("{}/{}", dir, name)));
        }
        self.put_node(&DagNode::Directory(directory)).await
    }

    /// Entries of `dir` in enumeration order
    pub async fn ls(&self, dir: &Cid) -> Result<Vec<DirEntry>, UnixfsError> {
        let directory = self.load_directory(dir).await?;
        Ok(directory
            .entries()
            .map(|(name, cid)| DirEntry {
                name: name.clone(),
                cid: *cid,
            })
            .collect())
    }

    /// Read a whole file into memory
    pub async fn cat_bytes(&self, cid: &Cid) -> Result<Bytes, UnixfsError> {
        let mut stream = self.cat(cid).await?;
        let mut data = Vec::new();
        while let Some(chunk) = stream.next().await {
            data.extend_from_slice(&chunk?);
        }
        Ok(Bytes::from(data))
    }

    /// Stream the content of a file chunk by chunk
    pub async fn cat(
        &self,
        cid: &Cid,
    ) -> Result<BoxStream<'static, Result<Bytes, UnixfsError>>, UnixfsError> {
        let data = self.get_block(cid).await?;
        if cid.codec() == RAW {
            return Ok(stream::once(async move { Ok(data) }).boxed());
        }
        // foreign DAG-CBOR (e.g. imported from an archive)
        //  is neither one of our files nor directories
        let file = match DagNode::decode(&data) {
            Ok(DagNode::File(file)) => file,
            _ => return Err(UnixfsError::NotAFile(*cid)),
        };

        let blocks = self.blocks.clone();
        Ok(stream::iter(file.chunks)
            .then(move |chunk| {
                let blocks = blocks.clone();
                async move { blocks.get(&chunk).await.map_err(UnixfsError::from) }
            })
            .boxed())
    }

    /// Children of the node at `cid`. Leaves have none.
    pub async fn links(&self, cid: &Cid) -> Result<Vec<Cid>, UnixfsError> {
        let data = self.get_block(cid).await?;
        Ok(block_links(cid, &data)?)
    }

    async fn load_directory(&self, cid: &Cid) -> Result<Directory, UnixfsError> {
        if cid.codec() != DAG_CBOR {
            return Err(UnixfsError::NotADirectory(*cid));
        }
        let data = self.get_block(cid).await?;
        match DagNode::decode(&data) {
            Ok(DagNode::Directory(directory)) => Ok(directory),
            _ => Err(UnixfsError::NotADirectory(*cid)),
        }
    }

    async fn get_block(&self, cid: &Cid) -> Result<Bytes, UnixfsError> {
        match self.blocks.get(cid).await {
            Ok(data) => Ok(data),
            Err(BlockstoreError::NotFound(cid)) => Err(UnixfsError::NotFound(cid.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    async fn put_raw(&self, data: Bytes) -> Result<Cid, UnixfsError> {
        let cid = cid_for(RAW, &data);
        self.blocks.put(&cid, data).await?;
        Ok(cid)
    }

    async fn put_node(&self, node: &DagNode) -> Result<Cid, UnixfsError> {
        let (cid, data) = node.to_block()?;
        self.blocks.put(&cid, Bytes::from(data)).await?;
        Ok(cid)
    }
}
