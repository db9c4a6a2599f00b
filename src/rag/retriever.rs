//! Query-time context retrieval.
//!
//! Two strategies behind one trait: the canonical embedding retriever backed
//! by the vector store, and a degraded keyword fallback that scans the raw
//! profile files. The server picks one at startup from config.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;

use super::store::VectorStore;
use crate::core::errors::ApiError;
use crate::llm::LlmProvider;

/// What retrieval produced for one query.
#[derive(Debug, Clone, Default)]
pub struct Retrieval {
    /// Human-readable context block handed to the chat model. Empty when
    /// nothing matched.
    pub context: String,
    /// Source stems in first-seen rank order, deduplicated.
    pub sources: Vec<String>,
    /// Lowest cosine distance among the matches; `None` when there were no
    /// matches or the strategy has no distance notion.
    pub best_distance: Option<f32>,
}

#[async_trait]
pub trait Retriever: Send + Sync {
    /// Fetch up to `k` chunks of context for `query`.
    async fn retrieve(&self, query: &str, k: usize) -> Result<Retrieval, ApiError>;

    /// Relevance gate: should the retrieved context count as "used"?
    fn is_usable(&self, retrieval: &Retrieval) -> bool;
}

/// Canonical retriever: embeds the query and searches the vector collection.
pub struct EmbeddingRetriever {
    provider: Arc<dyn LlmProvider>,
    store: Arc<dyn VectorStore>,
    embedding_model: String,
    distance_threshold: f32,
}

impl EmbeddingRetriever {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        store: Arc<dyn VectorStore>,
        embedding_model: String,
        distance_threshold: f32,
    ) -> Self {
        Self {
            provider,
            store,
            embedding_model,
            distance_threshold,
        }
    }
}

#[async_trait]
impl Retriever for EmbeddingRetriever {
    async fn retrieve(&self, query: &str, k: usize) -> Result<Retrieval, ApiError> {
        let embeddings = self
            .provider
            .embed(&[query.to_string()], &self.embedding_model)
            .await?;
        let query_embedding = embeddings
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::Upstream("no embedding returned for query".to_string()))?;

        let matches = self.store.search(&query_embedding, k).await?;
        if matches.is_empty() {
            return Ok(Retrieval::default());
        }

        let best_distance = matches.first().map(|m| m.distance);

        let mut sources: Vec<String> = Vec::new();
        for result in &matches {
            if !sources.contains(&result.chunk.source) {
                sources.push(result.chunk.source.clone());
            }
        }

        let context = matches
            .iter()
            .map(|m| {
                format!(
                    "#source: {} (chunk {}, distance {:.3})\n{}",
                    m.chunk.source, m.chunk.chunk_index, m.distance, m.chunk.content
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n");

        Ok(Retrieval {
            context,
            sources,
            best_distance,
        })
    }

    // Boundary inclusive: a best distance exactly at the threshold counts.
    fn is_usable(&self, retrieval: &Retrieval) -> bool {
        retrieval
            .best_distance
            .is_some_and(|d| d <= self.distance_threshold)
    }
}

/// Degraded fallback: case-insensitive substring scoring over the raw
/// profile files. No embeddings, no distances; a positive score is the only
/// relevance signal.
pub struct KeywordRetriever {
    profile_dir: PathBuf,
}

/// How much of each matched file goes into the context.
const KEYWORD_CONTEXT_CHARS: usize = 2000;

impl KeywordRetriever {
    pub fn new(profile_dir: PathBuf) -> Self {
        Self { profile_dir }
    }
}

#[async_trait]
impl Retriever for KeywordRetriever {
    async fn retrieve(&self, query: &str, k: usize) -> Result<Retrieval, ApiError> {
        if !self.profile_dir.is_dir() {
            return Ok(Retrieval::default());
        }

        let words: Vec<String> = query
            .to_lowercase()
            .split_whitespace()
            .filter(|w| w.chars().count() > 2)
            .map(|w| w.to_string())
            .collect();
        if words.is_empty() {
            return Ok(Retrieval::default());
        }

        let mut scored: Vec<(usize, String, String)> = Vec::new();
        let entries = std::fs::read_dir(&self.profile_dir).map_err(ApiError::internal)?;
        for entry in entries.filter_map(|e| e.ok()) {
            let path = entry.path();
            if !path.is_file() || path.extension().is_none_or(|ext| ext != "txt") {
                continue;
            }

            let Ok(raw) = std::fs::read(&path) else {
                continue;
            };
            let text = String::from_utf8_lossy(&raw).to_string();
            let lower = text.to_lowercase();
            let score: usize = words.iter().map(|w| lower.matches(w.as_str()).count()).sum();
            if score > 0 {
                let stem = path
                    .file_stem()
                    .map(|s| s.to_string_lossy().to_string())
                    .unwrap_or_default();
                scored.push((score, stem, text));
            }
        }

        scored.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
        scored.truncate(k);

        let sources: Vec<String> = scored.iter().map(|(_, name, _)| name.clone()).collect();
        let context = scored
            .iter()
            .map(|(_, name, text)| {
                let excerpt: String = text.chars().take(KEYWORD_CONTEXT_CHARS).collect();
                format!("#source: {}\n{}", name, excerpt)
            })
            .collect::<Vec<_>>()
            .join("\n\n");

        Ok(Retrieval {
            context,
            sources,
            best_distance: None,
        })
    }

    fn is_usable(&self, retrieval: &Retrieval) -> bool {
        !retrieval.sources.is_empty()
    }
}
