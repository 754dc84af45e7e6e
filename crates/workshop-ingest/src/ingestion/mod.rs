//! Document ingestion pipeline: fetch, extract, chunk, embed, persist

mod chunker;
mod extractor;
mod fetcher;
mod pipeline;

pub use chunker::TextChunker;
pub use extractor::TextExtractor;
pub use fetcher::Fetcher;
pub use pipeline::IngestPipeline;
