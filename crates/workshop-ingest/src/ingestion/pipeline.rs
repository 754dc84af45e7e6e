//! Consolidated ingestion pipeline
//!
//! One pass per asset: fetch the source bytes, extract text, chunk it,
//! embed the chunks in a single batch, and persist everything atomically.

use std::sync::Arc;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::providers::EmbeddingProvider;
use crate::storage::AssetStore;
use crate::types::{Chunk, IngestReport};

use super::chunker::TextChunker;
use super::extractor::TextExtractor;
use super::fetcher::Fetcher;

/// Runs the whole ingestion pass for one asset
pub struct IngestPipeline {
    store: Arc<AssetStore>,
    embedder: Arc<dyn EmbeddingProvider>,
    fetcher: Fetcher,
    chunker: TextChunker,
}

impl IngestPipeline {
    /// Create a new pipeline over the given store and embedding provider
    pub fn new(
        store: Arc<AssetStore>,
        embedder: Arc<dyn EmbeddingProvider>,
        fetcher: Fetcher,
        chunker: TextChunker,
    ) -> Self {
        Self {
            store,
            embedder,
            fetcher,
            chunker,
        }
    }

    /// Ingest one asset and report the outcome.
    ///
    /// Never returns an error: any stage failure is recorded on the asset
    /// and reported back, so the asset always lands in a terminal state.
    /// Concurrent runs for the same asset are not serialized; the slower
    /// writer wins.
    pub async fn run(&self, asset_id: Uuid) -> IngestReport {
        match self.ingest(asset_id).await {
            Ok(count) => IngestReport::succeeded(count),
            Err(e) => {
                let message = e.to_string();
                tracing::error!("Ingestion failed for asset {}: {}", asset_id, message);

                if let Err(db_err) = self.store.mark_error(asset_id, &message) {
                    tracing::error!(
                        "Failed to record error state for asset {}: {}",
                        asset_id,
                        db_err
                    );
                }

                IngestReport::failed(message)
            }
        }
    }

    /// The fallible stages, in order
    async fn ingest(&self, asset_id: Uuid) -> Result<usize> {
        let asset = self
            .store
            .get_asset(asset_id)?
            .ok_or_else(|| Error::AssetNotFound(asset_id.to_string()))?;

        tracing::info!("Ingesting asset '{}' from {}", asset.name, asset.source_url);

        let data = self.fetcher.fetch(&asset.source_url).await?;
        let text = TextExtractor::extract(&asset.name, &data)?;
        let pieces = self.chunker.chunk(&text);

        let embeddings = if pieces.is_empty() {
            Vec::new()
        } else {
            self.embedder.embed_batch(&pieces).await?
        };

        let chunks: Vec<Chunk> = pieces
            .into_iter()
            .zip(embeddings)
            .enumerate()
            .map(|(i, (content, embedding))| Chunk::new(asset_id, i as u32, content, embedding))
            .collect();

        self.store.replace_chunks(asset_id, &chunks)?;
        self.store.mark_ready(asset_id, chunks.len() as u32)?;

        tracing::info!("Asset '{}' ready with {} chunks", asset.name, chunks.len());
        Ok(chunks.len())
    }
}
