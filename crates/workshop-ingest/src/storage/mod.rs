//! Storage module for persistent data
//!
//! SQLite for asset records and chunks, plus a flat blob directory for
//! uploaded files.

mod blobs;
mod database;

pub use blobs::BlobStore;
pub use database::AssetStore;
