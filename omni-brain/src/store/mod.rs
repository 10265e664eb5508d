//! Embedded vector store
//!
//! **[BRN-STORE-010]** Read side of the memory database: a sled tree of
//! bincode-encoded file records with their embedding vectors, written by
//! the external indexer. Search is a linear Euclidean scan; the index is
//! a few thousand rows, not millions.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

const FILES_TREE: &str = "files";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store path not found: {0}")]
    Missing(String),
    #[error("store open failed: {0}")]
    Open(String),
    #[error("store read failed: {0}")]
    Read(String),
}

/// One indexed file: display name, absolute path, embedding vector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    pub name: String,
    pub path: String,
    pub vector: Vec<f32>,
}

/// One search hit; `distance` is Euclidean, smaller is closer.
#[derive(Debug, Clone, PartialEq)]
pub struct FileHit {
    pub name: String,
    pub path: String,
    pub distance: f64,
}

#[derive(Debug)]
pub struct VectorStore {
    tree: sled::Tree,
}

impl VectorStore {
    /// Open the store at a fixed directory path. A missing path is
    /// reported as `Missing` so the registry can skip the store without
    /// treating it as a load failure.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if !path.exists() {
            return Err(StoreError::Missing(path.display().to_string()));
        }
        let db = sled::open(path).map_err(|e| StoreError::Open(e.to_string()))?;
        let tree = db
            .open_tree(FILES_TREE)
            .map_err(|e| StoreError::Open(e.to_string()))?;
        debug!(rows = tree.len(), "Vector store opened");
        Ok(Self { tree })
    }

    /// Number of indexed records.
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Insert or replace a record, keyed by path. Used by the indexer and
    /// by test fixtures; the brain itself only searches.
    pub fn insert(&self, record: &FileRecord) -> Result<(), StoreError> {
        let bytes = bincode::serialize(record).map_err(|e| StoreError::Read(e.to_string()))?;
        self.tree
            .insert(record.path.as_bytes(), bytes)
            .map_err(|e| StoreError::Read(e.to_string()))?;
        Ok(())
    }

    /// Linear scan: distance to every record, ascending, truncated to
    /// `limit`. Threshold filtering happens at the caller, the cut-off is
    /// configuration, not store semantics.
    pub fn search(&self, query: &[f32], limit: usize) -> Result<Vec<FileHit>, StoreError> {
        let mut hits = Vec::new();
        for row in self.tree.iter() {
            let (_, value) = row.map_err(|e| StoreError::Read(e.to_string()))?;
            let record: FileRecord = match bincode::deserialize(&value) {
                Ok(r) => r,
                // One corrupt row should not take the whole search down
                Err(e) => {
                    debug!(error = %e, "Skipping undecodable store row");
                    continue;
                }
            };
            if record.vector.len() != query.len() {
                continue;
            }
            hits.push(FileHit {
                distance: euclidean_distance(query, &record.vector),
                name: record.name,
                path: record.path,
            });
        }
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits.truncate(limit);
        Ok(hits)
    }
}

fn euclidean_distance(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let d = (*x - *y) as f64;
            d * d
        })
        .sum::<f64>()
        .sqrt()
}
