//! API routes for the ingestion server

pub mod assets;
pub mod ingest;

use axum::{
    extract::{DefaultBodyLimit, State},
    routing::{delete, get, post},
    Json, Router,
};

use crate::server::state::AppState;
use crate::types::InfoResponse;

/// Build all API routes
pub fn api_routes(max_upload_size: usize) -> Router<AppState> {
    Router::new()
        // Registration and ingestion
        .route("/assets", post(ingest::register_asset))
        .route(
            "/assets/upload",
            post(ingest::upload_asset).layer(DefaultBodyLimit::max(max_upload_size)),
        )
        .route("/assets/:id/index", post(ingest::reindex_asset))
        // Asset management
        .route("/assets", get(assets::list_assets))
        .route("/assets/:id", get(assets::get_asset))
        .route("/assets/:id", delete(assets::delete_asset))
        .route("/assets/:id/chunks", get(assets::list_chunks))
        // Info
        .route("/info", get(info))
}

/// GET /api/info - Service metadata
async fn info(State(state): State<AppState>) -> Json<InfoResponse> {
    let config = state.config();
    Json(InfoResponse {
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        embedding_model: config.embeddings.model.clone(),
        embedding_provider: state.embedder().name().to_string(),
        embedding_dimensions: state.embedder().dimensions(),
        chunk_size: config.chunking.chunk_size,
        chunk_overlap: config.chunking.chunk_overlap,
    })
}
