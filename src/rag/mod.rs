//! RAG (Retrieval-Augmented Generation) module.
//!
//! - `chunker`: fixed-size overlapping text splitting
//! - `store` / `sqlite`: the persisted vector collection
//! - `ingest`: the one-shot profile ingestion pipeline
//! - `retriever`: query-time context retrieval (embedding + keyword fallback)

pub mod chunker;
pub mod ingest;
pub mod retriever;
pub mod sqlite;
pub mod store;

pub use retriever::{EmbeddingRetriever, KeywordRetriever, Retrieval, Retriever};
pub use sqlite::SqliteVectorStore;
pub use store::{ClearOutcome, SearchResult, StoredChunk, VectorStore};
