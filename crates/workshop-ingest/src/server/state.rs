//! Application state for the ingestion server

use std::sync::Arc;

use crate::config::IngestConfig;
use crate::error::Result;
use crate::ingestion::{Fetcher, IngestPipeline, TextChunker};
use crate::providers::{EmbeddingProvider, OllamaEmbedder};
use crate::storage::{AssetStore, BlobStore};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Configuration
    config: IngestConfig,
    /// Asset and chunk persistence
    store: Arc<AssetStore>,
    /// Uploaded file storage
    blobs: Arc<BlobStore>,
    /// Embedding provider
    embedder: Arc<dyn EmbeddingProvider>,
    /// The ingestion pipeline wired over the components above
    pipeline: IngestPipeline,
}

impl AppState {
    /// Assemble state from explicit components.
    ///
    /// The provider and stores are injected here so tests can swap them
    /// without a config file or a live Ollama server.
    pub fn new(
        config: IngestConfig,
        store: Arc<AssetStore>,
        blobs: Arc<BlobStore>,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> Self {
        let pipeline = IngestPipeline::new(
            Arc::clone(&store),
            Arc::clone(&embedder),
            Fetcher::new(&config.fetch),
            TextChunker::new(config.chunking.chunk_size, config.chunking.chunk_overlap),
        );

        Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                blobs,
                embedder,
                pipeline,
            }),
        }
    }

    /// Open the stores and provider named by the configuration
    pub fn from_config(config: &IngestConfig) -> Result<Self> {
        let store = Arc::new(AssetStore::new(&config.storage.database_path)?);
        let blobs = Arc::new(BlobStore::new(config.storage.blob_dir.clone())?);
        let embedder: Arc<dyn EmbeddingProvider> =
            Arc::new(OllamaEmbedder::new(&config.embeddings));

        tracing::info!(
            "State initialized (db: {}, blobs: {}, embeddings: {} via {})",
            config.storage.database_path.display(),
            config.storage.blob_dir.display(),
            config.embeddings.model,
            config.embeddings.base_url
        );

        Ok(Self::new(config.clone(), store, blobs, embedder))
    }

    /// Get configuration
    pub fn config(&self) -> &IngestConfig {
        &self.inner.config
    }

    /// Get the asset store
    pub fn store(&self) -> &Arc<AssetStore> {
        &self.inner.store
    }

    /// Get the blob store
    pub fn blobs(&self) -> &Arc<BlobStore> {
        &self.inner.blobs
    }

    /// Get the embedding provider
    pub fn embedder(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.inner.embedder
    }

    /// Get the ingestion pipeline
    pub fn pipeline(&self) -> &IngestPipeline {
        &self.inner.pipeline
    }
}
