//! workshop-ingest: Document ingestion and embedding service for workshop assets
//!
//! Fetches workshop source material (documents, transcripts, datasets), extracts
//! plain text, splits it into overlapping chunks, embeds every chunk in one
//! batched call to a local Ollama instance, and stores the results in SQLite
//! behind a small HTTP API.

pub mod config;
pub mod error;
pub mod ingestion;
pub mod providers;
pub mod server;
pub mod storage;
pub mod types;

pub use config::IngestConfig;
pub use error::{Error, Result};
pub use ingestion::IngestPipeline;
pub use server::IngestServer;
pub use types::{Asset, AssetKind, AssetStatus, Chunk, IngestReport};
