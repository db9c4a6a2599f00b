//! One-shot ingestion pipeline.
//!
//! Reads every `.txt` file in the profile directory, chunks it, embeds the
//! chunks in fixed-size batches, and replaces the vector collection wholesale.
//! The collection is cleared before inserting, so re-running ingestion on an
//! unchanged corpus leaves the store byte-for-byte equivalent.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context};

use super::chunker::chunk_text;
use super::store::{ClearOutcome, StoredChunk, VectorStore};
use crate::llm::LlmProvider;

pub struct IngestConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub batch_size: usize,
    pub embedding_model: String,
}

#[derive(Debug, Clone, Copy)]
pub struct IngestReport {
    pub files: usize,
    pub chunks: usize,
}

pub struct Ingestor {
    provider: Arc<dyn LlmProvider>,
    store: Arc<dyn VectorStore>,
    config: IngestConfig,
}

impl Ingestor {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        store: Arc<dyn VectorStore>,
        config: IngestConfig,
    ) -> Self {
        Self {
            provider,
            store,
            config,
        }
    }

    /// Run the full pipeline against `profile_dir`.
    ///
    /// Fatal (returns `Err`) when the directory is missing, when no chunks
    /// are produced, or when the pre-insert clear fails. A failed clear
    /// aborts before any insert so stale entries can never silently survive.
    pub async fn run(&self, profile_dir: &Path) -> anyhow::Result<IngestReport> {
        if !profile_dir.is_dir() {
            bail!("Missing folder: {}", profile_dir.display());
        }

        let files = txt_files(profile_dir)?;
        let mut pending: Vec<StoredChunk> = Vec::new();

        for file in &files {
            let raw = std::fs::read(file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let text = String::from_utf8_lossy(&raw);

            let stem = file
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_default();
            let abs_path = file
                .canonicalize()
                .unwrap_or_else(|_| file.clone())
                .to_string_lossy()
                .to_string();

            for (idx, chunk) in chunk_text(&text, self.config.chunk_size, self.config.chunk_overlap)
                .into_iter()
                .enumerate()
            {
                pending.push(StoredChunk {
                    chunk_id: StoredChunk::compose_id(&stem, idx),
                    content: chunk,
                    source: stem.clone(),
                    chunk_index: idx as i64,
                    path: abs_path.clone(),
                });
            }
        }

        if pending.is_empty() {
            bail!("No .txt content found in {}", profile_dir.display());
        }

        match self
            .store
            .clear()
            .await
            .context("failed to clear the vector collection before ingest")?
        {
            ClearOutcome::Cleared(n) => tracing::info!("Cleared {} stale chunks", n),
            ClearOutcome::AlreadyEmpty => tracing::debug!("Collection was already empty"),
        }

        let total = pending.len();
        for batch in pending.chunks(self.config.batch_size.max(1)) {
            let texts: Vec<String> = batch.iter().map(|c| c.content.clone()).collect();
            let embeddings = self
                .provider
                .embed(&texts, &self.config.embedding_model)
                .await
                .context("embedding request failed")?;

            if embeddings.len() != batch.len() {
                bail!(
                    "embedding batch size mismatch: {} vectors for {} chunks",
                    embeddings.len(),
                    batch.len()
                );
            }

            let items: Vec<(StoredChunk, Vec<f32>)> =
                batch.iter().cloned().zip(embeddings).collect();
            self.store
                .insert_batch(items)
                .await
                .context("failed to insert chunk batch")?;
        }

        Ok(IngestReport {
            files: files.len(),
            chunks: total,
        })
    }
}

/// All `.txt` files in the directory, sorted by name for stable chunk ids.
fn txt_files(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read {}", dir.display()))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file() && path.extension().is_some_and(|ext| ext == "txt")
        })
        .collect();
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::ApiError;
    use crate::llm::types::ChatRequest;
    use crate::rag::sqlite::SqliteVectorStore;
    use async_trait::async_trait;

    /// Deterministic stand-in for the embeddings API: every input maps to a
    /// fixed-length vector derived from its character count.
    struct StubProvider;

    #[async_trait]
    impl LlmProvider for StubProvider {
        fn name(&self) -> &str {
            "stub"
        }

        async fn health_check(&self) -> Result<bool, ApiError> {
            Ok(true)
        }

        async fn chat(&self, _request: ChatRequest, _model_id: &str) -> Result<String, ApiError> {
            Ok("stub answer".to_string())
        }

        async fn embed(
            &self,
            inputs: &[String],
            _model_id: &str,
        ) -> Result<Vec<Vec<f32>>, ApiError> {
            Ok(inputs
                .iter()
                .map(|text| vec![text.chars().count() as f32, 1.0, 0.0])
                .collect())
        }
    }

    async fn temp_store() -> Arc<SqliteVectorStore> {
        let tmp = std::env::temp_dir().join(format!("persona-ingest-{}.db", uuid::Uuid::new_v4()));
        Arc::new(SqliteVectorStore::open(&tmp).await.unwrap())
    }

    fn ingestor(store: Arc<SqliteVectorStore>, chunk_size: usize, overlap: usize) -> Ingestor {
        Ingestor::new(
            Arc::new(StubProvider),
            store,
            IngestConfig {
                chunk_size,
                chunk_overlap: overlap,
                batch_size: 64,
                embedding_model: "stub-embed".to_string(),
            },
        )
    }

    #[tokio::test]
    async fn missing_directory_is_fatal() {
        let store = temp_store().await;
        let err = ingestor(store, 1200, 200)
            .run(Path::new("/nonexistent/profile"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Missing folder"));
    }

    #[tokio::test]
    async fn empty_corpus_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.md"), "markdown is ignored").unwrap();

        let store = temp_store().await;
        let err = ingestor(store, 1200, 200)
            .run(dir.path())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("No .txt content"));
    }

    #[tokio::test]
    async fn small_file_yields_one_chunk_with_composite_id() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("bio.txt"),
            "I was born in Paris in 1990. I studied engineering.",
        )
        .unwrap();

        let store = temp_store().await;
        let report = ingestor(store.clone(), 1200, 200)
            .run(dir.path())
            .await
            .unwrap();

        assert_eq!(report.files, 1);
        assert_eq!(report.chunks, 1);

        let results = store.search(&[51.0, 1.0, 0.0], 5).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].chunk.chunk_id, "bio::chunk0");
        assert_eq!(results[0].chunk.source, "bio");
        assert_eq!(results[0].chunk.chunk_index, 0);
    }

    #[tokio::test]
    async fn ids_are_unique_across_files_and_indices() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("bio.txt"), "a".repeat(250)).unwrap();
        std::fs::write(dir.path().join("work.txt"), "b".repeat(250)).unwrap();

        let store = temp_store().await;
        let report = ingestor(store.clone(), 100, 0).run(dir.path()).await.unwrap();

        assert_eq!(report.files, 2);
        assert_eq!(report.chunks, 6);
        assert_eq!(store.count().await.unwrap(), 6);

        let results = store.search(&[100.0, 1.0, 0.0], 10).await.unwrap();
        let mut ids: Vec<String> = results.iter().map(|r| r.chunk.chunk_id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 6);
    }

    #[tokio::test]
    async fn reingestion_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("bio.txt"), "c".repeat(500)).unwrap();

        let store = temp_store().await;
        let first = ingestor(store.clone(), 100, 20).run(dir.path()).await.unwrap();
        let snapshot_first = store.search(&[100.0, 1.0, 0.0], 50).await.unwrap();

        let second = ingestor(store.clone(), 100, 20).run(dir.path()).await.unwrap();
        let snapshot_second = store.search(&[100.0, 1.0, 0.0], 50).await.unwrap();

        assert_eq!(first.chunks, second.chunks);
        assert_eq!(store.count().await.unwrap(), first.chunks);
        let ids = |snap: &[crate::rag::store::SearchResult]| {
            let mut rows: Vec<(String, String)> = snap
                .iter()
                .map(|r| (r.chunk.chunk_id.clone(), r.chunk.content.clone()))
                .collect();
            rows.sort();
            rows
        };
        assert_eq!(ids(&snapshot_first), ids(&snapshot_second));
    }
}
