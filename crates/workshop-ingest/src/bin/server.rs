//! Ingestion server binary
//!
//! Run with: cargo run -p workshop-ingest --bin workshop-ingest-server

use workshop_ingest::{config::IngestConfig, server::IngestServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "workshop_ingest=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!(
        r#"
╔═══════════════════════════════════════════════════════════╗
║                  Workshop Ingest Service                  ║
║          Document Ingestion for Workshop Assets           ║
╚═══════════════════════════════════════════════════════════╝
"#
    );

    // Load configuration
    let config = IngestConfig::load_or_default()?;

    tracing::info!("Configuration loaded");
    tracing::info!("  - Embedding model: {}", config.embeddings.model);
    tracing::info!("  - Embedding dimensions: {}", config.embeddings.dimensions);
    tracing::info!("  - Chunk size: {}", config.chunking.chunk_size);
    tracing::info!("  - Chunk overlap: {}", config.chunking.chunk_overlap);
    tracing::info!("  - Database: {}", config.storage.database_path.display());

    // Check Ollama
    tracing::info!("Checking Ollama at {}...", config.embeddings.base_url);
    let client = reqwest::Client::new();
    match client
        .get(format!("{}/api/tags", config.embeddings.base_url))
        .send()
        .await
    {
        Ok(resp) if resp.status().is_success() => {
            tracing::info!("Ollama is running");
        }
        _ => {
            tracing::warn!("Ollama not available at {}", config.embeddings.base_url);
            tracing::warn!("Assets can still be registered, but indexing will fail.");
            tracing::warn!("To start Ollama:");
            tracing::warn!("  1. Install: brew install ollama");
            tracing::warn!("  2. Start: ollama serve");
            tracing::warn!("  3. Pull the model: ollama pull {}", config.embeddings.model);
        }
    }

    // Create and start server
    let server = IngestServer::new(config)?;

    println!("\nServer starting...");
    println!("  API: http://{}", server.address());
    println!("  Health: http://{}/health", server.address());
    println!("  API Info: http://{}/api/info", server.address());
    println!("\nEndpoints:");
    println!("  POST   /api/assets            - Register an asset by URL");
    println!("  POST   /api/assets/upload     - Upload a file as an asset");
    println!("  POST   /api/assets/:id/index  - Re-run ingestion for an asset");
    println!("  GET    /api/assets            - List assets");
    println!("  GET    /api/assets/:id        - Get one asset");
    println!("  GET    /api/assets/:id/chunks - List an asset's chunks");
    println!("  DELETE /api/assets/:id        - Delete an asset");
    println!("\nPress Ctrl+C to stop\n");

    server.start().await?;

    Ok(())
}
