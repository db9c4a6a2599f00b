//! VectorStore trait — abstract interface for the persisted chunk collection.
//!
//! The shipping implementation is `SqliteVectorStore` in the `sqlite` module.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::errors::ApiError;

/// A persisted profile chunk with its metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredChunk {
    /// Composite identifier: `{source_stem}::chunk{index}`.
    pub chunk_id: String,
    /// The raw chunk text.
    pub content: String,
    /// Stem of the originating file, used as the public source id.
    pub source: String,
    /// Zero-based chunk position within the source file.
    pub chunk_index: i64,
    /// Absolute path of the originating file.
    pub path: String,
}

impl StoredChunk {
    /// Build the composite chunk id for a source stem and index.
    pub fn compose_id(source: &str, index: usize) -> String {
        format!("{}::chunk{}", source, index)
    }
}

/// One nearest-neighbor match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub chunk: StoredChunk,
    /// Cosine distance (lower = more relevant).
    pub distance: f32,
}

/// Outcome of wiping the collection before re-ingestion.
///
/// Hard failures are `Err`, never swallowed; a clear that fails must abort
/// the ingestion run before any insert happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearOutcome {
    /// `n` prior entries were removed.
    Cleared(usize),
    /// The collection had nothing to remove.
    AlreadyEmpty,
}

/// Abstract persisted vector collection.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Insert chunks with their embeddings, replacing on id collision.
    async fn insert_batch(&self, items: Vec<(StoredChunk, Vec<f32>)>) -> Result<(), ApiError>;

    /// Return the `limit` nearest chunks by cosine distance, ascending.
    async fn search(
        &self,
        query_embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<SearchResult>, ApiError>;

    /// Remove every entry in the collection.
    async fn clear(&self) -> Result<ClearOutcome, ApiError>;

    /// Total number of stored chunks.
    async fn count(&self) -> Result<usize, ApiError>;

    /// Release the underlying connection; part of application shutdown.
    async fn close(&self);
}
