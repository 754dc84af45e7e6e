//! Asset management endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::{AssetSummary, ChunkSummary, DeleteResponse};

/// Query parameters for listing assets
#[derive(Debug, Deserialize)]
pub struct ListAssetsQuery {
    /// Restrict the list to one workshop
    pub workshop_id: Option<String>,
}

/// Response for the asset list
#[derive(Debug, Serialize)]
pub struct AssetListResponse {
    pub assets: Vec<AssetSummary>,
    pub total: usize,
}

/// Response for the chunk list
#[derive(Debug, Serialize)]
pub struct ChunkListResponse {
    pub asset_id: Uuid,
    pub chunks: Vec<ChunkSummary>,
    pub total: usize,
}

/// GET /api/assets - List assets, newest first
pub async fn list_assets(
    State(state): State<AppState>,
    Query(params): Query<ListAssetsQuery>,
) -> Result<Json<AssetListResponse>> {
    let assets = state.store().list_assets(params.workshop_id.as_deref())?;
    let summaries: Vec<AssetSummary> = assets.iter().map(AssetSummary::from).collect();

    Ok(Json(AssetListResponse {
        total: summaries.len(),
        assets: summaries,
    }))
}

/// GET /api/assets/:id - Get one asset
pub async fn get_asset(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AssetSummary>> {
    let asset = state
        .store()
        .get_asset(id)?
        .ok_or_else(|| Error::AssetNotFound(id.to_string()))?;

    Ok(Json(AssetSummary::from(&asset)))
}

/// GET /api/assets/:id/chunks - List an asset's chunks without the vectors
pub async fn list_chunks(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ChunkListResponse>> {
    if state.store().get_asset(id)?.is_none() {
        return Err(Error::AssetNotFound(id.to_string()));
    }

    let chunks = state.store().get_chunks(id)?;
    let summaries: Vec<ChunkSummary> = chunks.iter().map(ChunkSummary::from).collect();

    Ok(Json(ChunkListResponse {
        asset_id: id,
        total: summaries.len(),
        chunks: summaries,
    }))
}

/// DELETE /api/assets/:id - Remove an asset, its chunks, and its blob
pub async fn delete_asset(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DeleteResponse>> {
    let asset = state
        .store()
        .get_asset(id)?
        .ok_or_else(|| Error::AssetNotFound(id.to_string()))?;

    let deleted = state.store().delete_asset(id)?;

    if let Some(blob_name) = &asset.blob_name {
        if let Err(e) = state.blobs().remove(blob_name) {
            tracing::warn!("Failed to remove blob '{}' for asset {}: {}", blob_name, id, e);
        }
    }

    tracing::info!("Deleted asset {} ('{}')", id, asset.name);

    Ok(Json(DeleteResponse { deleted, id }))
}
