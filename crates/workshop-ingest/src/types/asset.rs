//! Asset and chunk types for the ingestion pipeline

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of source material behind an asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    /// PDF or prose document
    Document,
    /// Session or talk transcript
    Transcript,
    /// Tabular or structured data export
    Dataset,
}

impl AssetKind {
    /// Infer the kind from a filename extension
    pub fn from_filename(filename: &str) -> Self {
        let ext = filename.rsplit('.').next().unwrap_or("").to_lowercase();
        match ext.as_str() {
            "vtt" | "srt" => Self::Transcript,
            "csv" | "tsv" | "json" | "jsonl" => Self::Dataset,
            _ => Self::Document,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Document => "document",
            Self::Transcript => "transcript",
            Self::Dataset => "dataset",
        }
    }
}

/// Processing status of an asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetStatus {
    /// Ingestion is in flight
    Processing,
    /// Chunks are persisted and searchable
    Ready,
    /// The last ingestion attempt failed
    Error,
}

impl AssetStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Processing => "processing",
            Self::Ready => "ready",
            Self::Error => "error",
        }
    }
}

/// A source document registered against a workshop
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asset {
    /// Unique asset ID
    pub id: Uuid,
    /// Workshop this asset belongs to
    pub workshop_id: String,
    /// Display name, usually the original filename
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
    /// Name of the stored blob when the bytes were uploaded to us
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blob_name: Option<String>,
    /// When the asset was registered
    pub created_at: DateTime<Utc>,
    /// When the asset last changed state
    pub updated_at: DateTime<Utc>,
}

impl Asset {
    /// Create a new asset in the processing state
    pub fn new(workshop_id: String, name: String, source_url: String, kind: AssetKind) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            workshop_id,
            name,
            source_url,
            kind,
            status: AssetStatus::Processing,
            error_message: None,
            chunk_count: 0,
            blob_name: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A chunk of extracted text with its embedding
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// Unique chunk ID
    pub id: Uuid,
    /// Asset this chunk belongs to
    pub asset_id: Uuid,
    /// Zero-based position within the asset
    pub chunk_index: u32,
    /// Chunk text content
    pub content: String,
    /// Embedding vector
    pub embedding: Vec<f32>,
    /// When the chunk was persisted
    pub created_at: DateTime<Utc>,
}

impl Chunk {
    /// Create a new chunk
    pub fn new(asset_id: Uuid, chunk_index: u32, content: String, embedding: Vec<f32>) -> Self {
        Self {
            id: Uuid::new_v4(),
            asset_id,
            chunk_index,
            content,
            embedding,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_filename() {
        assert_eq!(AssetKind::from_filename("slides.pdf"), AssetKind::Document);
        assert_eq!(AssetKind::from_filename("notes.md"), AssetKind::Document);
        assert_eq!(
            AssetKind::from_filename("session.vtt"),
            AssetKind::Transcript
        );
        assert_eq!(
            AssetKind::from_filename("captions.SRT"),
            AssetKind::Transcript
        );
        assert_eq!(AssetKind::from_filename("export.csv"), AssetKind::Dataset);
        assert_eq!(AssetKind::from_filename("rows.jsonl"), AssetKind::Dataset);
        assert_eq!(AssetKind::from_filename("no-extension"), AssetKind::Document);
    }

    #[test]
    fn test_new_asset_starts_processing() {
        let asset = Asset::new(
            "ws-1".to_string(),
            "deck.pdf".to_string(),
            "https://example.com/deck.pdf".to_string(),
            AssetKind::Document,
        );
        assert_eq!(asset.status, AssetStatus::Processing);
        assert_eq!(asset.chunk_count, 0);
        assert!(asset.error_message.is_none());
        assert!(asset.blob_name.is_none());
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&AssetStatus::Ready).unwrap();
        assert_eq!(json, "\"ready\"");
        let json = serde_json::to_string(&AssetKind::Transcript).unwrap();
        assert_eq!(json, "\"transcript\"");
    }
}
