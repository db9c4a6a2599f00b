use std::sync::Arc;

use crate::core::config::{AppConfig, AppPaths, RetrieverMode};
use crate::llm::{LlmProvider, OpenAiProvider};
use crate::rag::{EmbeddingRetriever, KeywordRetriever, Retriever, SqliteVectorStore, VectorStore};
use crate::unanswered::UnansweredLog;

/// Dependency container for the query service. Everything the handlers need
/// is constructed here once, at startup; nothing hangs off module globals.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub paths: AppPaths,
    pub llm: Arc<dyn LlmProvider>,
    pub retriever: Arc<dyn Retriever>,
    pub unanswered: UnansweredLog,
    store: Option<Arc<dyn VectorStore>>,
}

impl AppState {
    /// Production wiring: OpenAI-style provider plus the configured
    /// retriever variant.
    pub async fn initialize(config: AppConfig, paths: AppPaths) -> anyhow::Result<Arc<Self>> {
        let provider: Arc<dyn LlmProvider> = Arc::new(OpenAiProvider::new(
            config.api_base_url.clone(),
            config.api_key.clone(),
        ));
        Self::build(config, paths, provider).await
    }

    /// Wiring with an injected provider; tests use this to swap in stubs.
    pub async fn build(
        config: AppConfig,
        paths: AppPaths,
        provider: Arc<dyn LlmProvider>,
    ) -> anyhow::Result<Arc<Self>> {
        let (retriever, store): (Arc<dyn Retriever>, Option<Arc<dyn VectorStore>>) =
            match config.retriever_mode {
                RetrieverMode::Embedding => {
                    let store: Arc<dyn VectorStore> =
                        Arc::new(SqliteVectorStore::open(&paths.store_path).await?);
                    let retriever = EmbeddingRetriever::new(
                        provider.clone(),
                        store.clone(),
                        config.embedding_model.clone(),
                        config.distance_threshold,
                    );
                    (Arc::new(retriever), Some(store))
                }
                RetrieverMode::Keyword => {
                    tracing::warn!("Using the degraded keyword retriever; no embeddings in play");
                    let retriever = KeywordRetriever::new(paths.profile_dir.clone());
                    (Arc::new(retriever), None)
                }
            };

        let unanswered = UnansweredLog::new(paths.unanswered_path.clone());

        Ok(Arc::new(AppState {
            config,
            paths,
            llm: provider,
            retriever,
            unanswered,
            store,
        }))
    }

    /// Release held resources; called after the server stops accepting
    /// requests.
    pub async fn shutdown(&self) {
        if let Some(store) = &self.store {
            store.close().await;
        }
    }
}
