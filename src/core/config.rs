use std::env;
use std::path::{Path, PathBuf};

use anyhow::Context;

/// Filesystem layout of the service. Everything lives under one data
/// directory, mirroring the layout the ingestion job expects.
#[derive(Debug, Clone)]
pub struct AppPaths {
    pub data_dir: PathBuf,
    pub profile_dir: PathBuf,
    pub store_path: PathBuf,
    pub log_dir: PathBuf,
    pub unanswered_path: PathBuf,
}

impl AppPaths {
    pub fn new() -> Self {
        let data_dir = env::var("PERSONA_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data"));
        Self::under(&data_dir)
    }

    /// Build the full layout beneath an explicit data directory.
    pub fn under(data_dir: &Path) -> Self {
        AppPaths {
            data_dir: data_dir.to_path_buf(),
            profile_dir: data_dir.join("profile"),
            store_path: data_dir.join("profile_store").join("chunks.db"),
            log_dir: data_dir.join("logs"),
            unanswered_path: data_dir.join("unanswered.txt"),
        }
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}

/// Which retrieval strategy the query service uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetrieverMode {
    /// Embed the query and search the vector store (canonical).
    Embedding,
    /// Degraded fallback: substring scoring over the raw profile files.
    Keyword,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_key: String,
    pub api_base_url: String,
    pub chat_model: String,
    pub embedding_model: String,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub embed_batch_size: usize,
    pub top_k: usize,
    pub distance_threshold: f32,
    pub retriever_mode: RetrieverMode,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let api_key = env::var("OPENAI_API_KEY")
            .context("OPENAI_API_KEY is not set; the embedding/chat provider needs it")?;

        Ok(AppConfig {
            api_key,
            api_base_url: env_or("OPENAI_BASE_URL", "https://api.openai.com"),
            chat_model: env_or("PERSONA_CHAT_MODEL", "gpt-4.1-nano"),
            embedding_model: env_or("PERSONA_EMBEDDING_MODEL", "text-embedding-3-small"),
            chunk_size: env_parsed("PERSONA_CHUNK_SIZE", 1200),
            chunk_overlap: env_parsed("PERSONA_CHUNK_OVERLAP", 200),
            embed_batch_size: env_parsed("PERSONA_EMBED_BATCH", 64),
            top_k: env_parsed("PERSONA_TOP_K", 5),
            distance_threshold: env_parsed("PERSONA_DISTANCE_THRESHOLD", 0.35),
            retriever_mode: retriever_mode_from_env(),
            port: env_parsed("PORT", 0),
        })
    }
}

fn retriever_mode_from_env() -> RetrieverMode {
    match env::var("PERSONA_RETRIEVER").as_deref() {
        Ok("keyword") => RetrieverMode::Keyword,
        Ok(other) if other != "embedding" => {
            tracing::warn!("Unknown PERSONA_RETRIEVER value {:?}; using embedding", other);
            RetrieverMode::Embedding
        }
        _ => RetrieverMode::Embedding,
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parsed<T: std::str::FromStr + Copy>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|val| val.parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_hang_off_the_data_dir() {
        let paths = AppPaths::under(Path::new("/tmp/persona"));
        assert_eq!(paths.profile_dir, Path::new("/tmp/persona/profile"));
        assert_eq!(
            paths.store_path,
            Path::new("/tmp/persona/profile_store/chunks.db")
        );
        assert_eq!(paths.unanswered_path, Path::new("/tmp/persona/unanswered.txt"));
    }
}
