//! Core types shared across the service

pub mod asset;
pub mod response;

pub use asset::{Asset, AssetKind, AssetStatus, Chunk};
pub use response::{
    AssetResponse, AssetSummary, ChunkSummary, DeleteResponse, InfoResponse, IngestReport,
};
