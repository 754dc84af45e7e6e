//! Response types for the ingestion API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::asset::{Asset, AssetKind, AssetStatus, Chunk};

/// Outcome of a single ingestion run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestReport {
    /// Whether the run reached the ready state
    pub success: bool,
    /// Number of chunks persisted by this run
    pub chunks_processed: usize,
    /// Failure detail when the run did not succeed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl IngestReport {
    /// Report a completed run
    pub fn succeeded(chunks_processed: usize) -> Self {
        Self {
            success: true,
            chunks_processed,
            error: None,
        }
    }

    /// Report a failed run
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            chunks_processed: 0,
            error: Some(error.into()),
        }
    }
}

/// Asset fields returned by list and detail endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetSummary {
    /// Unique asset ID
    pub id: Uuid,
    /// Workshop this asset belongs to
    pub workshop_id: String,
    /// Display name
    pub name: String,
    /// URL the raw bytes are fetched from
    pub source_url: String,
    /// Kind of source material
    pub kind: AssetKind,
    /// Current processing status
    pub status: AssetStatus,
    /// Failure detail from the last ingestion attempt
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// Number of persisted chunks
    pub chunk_count: u32,
    /// When the asset was registered
    pub created_at: DateTime<Utc>,
    /// When the asset last changed state
    pub updated_at: DateTime<Utc>,
}

impl From<&Asset> for AssetSummary {
    fn from(asset: &Asset) -> Self {
        Self {
            id: asset.id,
            workshop_id: asset.workshop_id.clone(),
            name: asset.name.clone(),
            source_url: asset.source_url.clone(),
            kind: asset.kind,
            status: asset.status,
            error_message: asset.error_message.clone(),
            chunk_count: asset.chunk_count,
            created_at: asset.created_at,
            updated_at: asset.updated_at,
        }
    }
}

/// Chunk fields returned by the chunk listing, without the raw vector
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkSummary {
    /// Unique chunk ID
    pub id: Uuid,
    /// Zero-based position within the asset
    pub chunk_index: u32,
    /// Chunk text content
    pub content: String,
    /// Dimensionality of the stored embedding
    pub embedding_dimensions: usize,
    /// When the chunk was persisted
    pub created_at: DateTime<Utc>,
}

impl From<&Chunk> for ChunkSummary {
    fn from(chunk: &Chunk) -> Self {
        Self {
            id: chunk.id,
            chunk_index: chunk.chunk_index,
            content: chunk.content.clone(),
            embedding_dimensions: chunk.embedding.len(),
            created_at: chunk.created_at,
        }
    }
}

/// Response to registration and indexing requests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetResponse {
    /// The asset after the run finished
    pub asset: AssetSummary,
    /// Outcome of the ingestion run
    pub ingest: IngestReport,
}

/// Response to a delete request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub deleted: bool,
    pub id: Uuid,
}

/// Service metadata returned by the info endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InfoResponse {
    pub name: String,
    pub version: String,
    /// Embedding model the service is configured for
    pub embedding_model: String,
    /// Embedding provider name
    pub embedding_provider: String,
    /// Dimensionality of the vectors the provider produces
    pub embedding_dimensions: usize,
    /// Chunk size in characters
    pub chunk_size: usize,
    /// Overlap between consecutive chunks in characters
    pub chunk_overlap: usize,
}
