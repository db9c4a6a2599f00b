//! One-shot ingestion job: rebuild the vector collection from the profile
//! directory. Run independently of the server.

use std::sync::Arc;

use persona_rag::core::config::{AppConfig, AppPaths};
use persona_rag::core::logging;
use persona_rag::llm::OpenAiProvider;
use persona_rag::rag::ingest::{IngestConfig, Ingestor};
use persona_rag::rag::{SqliteVectorStore, VectorStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let paths = AppPaths::new();
    logging::init(&paths);

    let config = AppConfig::from_env()?;

    let provider = Arc::new(OpenAiProvider::new(
        config.api_base_url.clone(),
        config.api_key.clone(),
    ));
    let store = Arc::new(SqliteVectorStore::open(&paths.store_path).await?);

    let ingestor = Ingestor::new(
        provider,
        store.clone(),
        IngestConfig {
            chunk_size: config.chunk_size,
            chunk_overlap: config.chunk_overlap,
            batch_size: config.embed_batch_size,
            embedding_model: config.embedding_model.clone(),
        },
    );

    let report = ingestor.run(&paths.profile_dir).await?;
    store.close().await;

    println!(
        "Ingested {} chunks from {} files.",
        report.chunks, report.files
    );

    Ok(())
}
