//! Provider abstractions for embedding backends
//!
//! The pipeline talks to embeddings through a trait so tests and future
//! backends can swap in without touching ingestion code.

pub mod embedding;
pub mod ollama;

pub use embedding::EmbeddingProvider;
pub use ollama::OllamaEmbedder;
