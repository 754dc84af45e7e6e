//! Asset registration and ingestion endpoints

use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::{Asset, AssetKind, AssetResponse, AssetSummary};

/// Request body for registering an asset by URL
#[derive(Debug, Deserialize)]
pub struct RegisterAssetRequest {
    /// Workshop the asset belongs to
    pub workshop_id: String,
    /// Display name, used for extraction routing
    pub name: String,
    /// Where to fetch the raw bytes from
    pub source_url: String,
    /// Optional kind; inferred from the name when absent
    #[serde(default)]
    pub kind: Option<AssetKind>,
}

/// POST /api/assets - Register an asset by URL and ingest it
pub async fn register_asset(
    State(state): State<AppState>,
    Json(request): Json<RegisterAssetRequest>,
) -> Result<Json<AssetResponse>> {
    if request.workshop_id.trim().is_empty() {
        return Err(Error::invalid_request("workshop_id must not be empty"));
    }
    if request.name.trim().is_empty() {
        return Err(Error::invalid_request("name must not be empty"));
    }

    let kind = request
        .kind
        .unwrap_or_else(|| AssetKind::from_filename(&request.name));
    let asset = Asset::new(request.workshop_id, request.name, request.source_url, kind);
    state.store().insert_asset(&asset)?;

    tracing::info!("Registered asset {} ('{}')", asset.id, asset.name);

    ingest_and_respond(&state, asset.id).await
}

/// POST /api/assets/upload - Upload a file, store it, and ingest it
pub async fn upload_asset(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<AssetResponse>> {
    let mut workshop_id: Option<String> = None;
    let mut kind: Option<AssetKind> = None;
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::invalid_request(format!("Failed to read multipart field: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "workshop_id" => {
                let text = field.text().await.map_err(|e| {
                    Error::invalid_request(format!("Failed to read workshop_id: {}", e))
                })?;
                workshop_id = Some(text);
            }
            "kind" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| Error::invalid_request(format!("Failed to read kind: {}", e)))?;
                kind = Some(parse_kind(&text)?);
            }
            "file" => {
                let filename = field
                    .file_name()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| format!("upload-{}.bin", Uuid::new_v4()));
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| Error::invalid_request(format!("Failed to read file: {}", e)))?;
                upload = Some((filename, data.to_vec()));
            }
            _ => {}
        }
    }

    let workshop_id = workshop_id
        .filter(|w| !w.trim().is_empty())
        .ok_or_else(|| Error::invalid_request("upload needs a non-empty 'workshop_id' field"))?;
    let (filename, data) =
        upload.ok_or_else(|| Error::invalid_request("upload needs a 'file' field"))?;

    let blob_name = state.blobs().store(&filename, &data)?;
    let source_url = format!(
        "{}/blobs/{}",
        state.config().server.public_url.trim_end_matches('/'),
        blob_name
    );
    let kind = kind.unwrap_or_else(|| AssetKind::from_filename(&filename));

    let mut asset = Asset::new(workshop_id, filename, source_url, kind);
    asset.blob_name = Some(blob_name);
    state.store().insert_asset(&asset)?;

    tracing::info!(
        "Stored upload '{}' ({} bytes) as asset {}",
        asset.name,
        data.len(),
        asset.id
    );

    ingest_and_respond(&state, asset.id).await
}

/// POST /api/assets/:id/index - Re-run ingestion for an existing asset
pub async fn reindex_asset(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AssetResponse>> {
    if state.store().get_asset(id)?.is_none() {
        return Err(Error::AssetNotFound(id.to_string()));
    }

    ingest_and_respond(&state, id).await
}

/// Run the pipeline and assemble the response from the stored asset
async fn ingest_and_respond(state: &AppState, asset_id: Uuid) -> Result<Json<AssetResponse>> {
    let report = state.pipeline().run(asset_id).await;

    let asset = state
        .store()
        .get_asset(asset_id)?
        .ok_or_else(|| Error::AssetNotFound(asset_id.to_string()))?;

    Ok(Json(AssetResponse {
        asset: AssetSummary::from(&asset),
        ingest: report,
    }))
}

fn parse_kind(s: &str) -> Result<AssetKind> {
    match s {
        "document" => Ok(AssetKind::Document),
        "transcript" => Ok(AssetKind::Transcript),
        "dataset" => Ok(AssetKind::Dataset),
        other => Err(Error::invalid_request(format!(
            "Unknown asset kind '{}'",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::routing::get;
    use axum::Router;
    use parking_lot::Mutex;
    use std::sync::Arc;

    use crate::config::IngestConfig;
    use crate::providers::EmbeddingProvider;
    use crate::storage::{AssetStore, BlobStore};
    use crate::types::AssetStatus;

    struct FixedEmbedder;

    #[async_trait]
    impl EmbeddingProvider for FixedEmbedder {
        async fn embed_batch(&self, texts: &[String]) -> crate::error::Result<Vec<Vec<f32>>> {
            Ok(texts.iter().map(|_| vec![0.5f32; 4]).collect())
        }

        fn dimensions(&self) -> usize {
            4
        }

        async fn health_check(&self) -> crate::error::Result<bool> {
            Ok(true)
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    fn test_state(blob_dir: &std::path::Path) -> AppState {
        AppState::new(
            IngestConfig::default(),
            Arc::new(AssetStore::in_memory().unwrap()),
            Arc::new(BlobStore::new(blob_dir.to_path_buf()).unwrap()),
            Arc::new(FixedEmbedder),
        )
    }

    async fn spawn_file_server(content: &str) -> String {
        let content = Arc::new(Mutex::new(content.to_string()));
        let router = Router::new().route(
            "/doc.txt",
            get(move || {
                let content = Arc::clone(&content);
                async move { content.lock().clone() }
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}/doc.txt", addr)
    }

    #[tokio::test]
    async fn test_register_ingests_and_returns_ready_asset() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());
        let url = spawn_file_server("workshop notes for everyone").await;

        let response = register_asset(
            State(state.clone()),
            Json(RegisterAssetRequest {
                workshop_id: "ws-1".to_string(),
                name: "notes.txt".to_string(),
                source_url: url,
                kind: None,
            }),
        )
        .await
        .unwrap();

        let body = response.0;
        assert!(body.ingest.success);
        assert_eq!(body.ingest.chunks_processed, 1);
        assert_eq!(body.asset.status, AssetStatus::Ready);
        assert_eq!(body.asset.kind, AssetKind::Document);
        assert_eq!(body.asset.chunk_count, 1);
    }

    #[tokio::test]
    async fn test_register_rejects_blank_workshop_id() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());

        let err = register_asset(
            State(state),
            Json(RegisterAssetRequest {
                workshop_id: "   ".to_string(),
                name: "notes.txt".to_string(),
                source_url: "https://example.com/notes.txt".to_string(),
                kind: None,
            }),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, Error::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_register_with_unreachable_source_reports_failed_run() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let response = register_asset(
            State(state.clone()),
            Json(RegisterAssetRequest {
                workshop_id: "ws-1".to_string(),
                name: "notes.txt".to_string(),
                source_url: format!("http://{}/doc.txt", addr),
                kind: None,
            }),
        )
        .await
        .unwrap();

        let body = response.0;
        assert!(!body.ingest.success);
        assert!(body.ingest.error.is_some());
        assert_eq!(body.asset.status, AssetStatus::Error);
        assert!(body.asset.error_message.is_some());
    }

    #[tokio::test]
    async fn test_register_infers_kind_from_name() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());
        let url = spawn_file_server("00:00:01 welcome everybody").await;

        let response = register_asset(
            State(state),
            Json(RegisterAssetRequest {
                workshop_id: "ws-1".to_string(),
                name: "session.vtt".to_string(),
                source_url: url,
                kind: None,
            }),
        )
        .await
        .unwrap();

        assert_eq!(response.0.asset.kind, AssetKind::Transcript);
    }

    #[tokio::test]
    async fn test_reindex_missing_asset_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());

        let err = reindex_asset(State(state), Path(Uuid::new_v4()))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::AssetNotFound(_)));
    }

    #[tokio::test]
    async fn test_reindex_reruns_the_pipeline() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());
        let url = spawn_file_server("fresh content").await;

        let registered = register_asset(
            State(state.clone()),
            Json(RegisterAssetRequest {
                workshop_id: "ws-1".to_string(),
                name: "notes.txt".to_string(),
                source_url: url,
                kind: None,
            }),
        )
        .await
        .unwrap();
        let asset_id = registered.0.asset.id;

        let response = reindex_asset(State(state), Path(asset_id)).await.unwrap();
        assert!(response.0.ingest.success);
        assert_eq!(response.0.asset.status, AssetStatus::Ready);
        assert_eq!(response.0.asset.chunk_count, 1);
    }

    #[test]
    fn test_parse_kind_accepts_known_values() {
        assert_eq!(parse_kind("document").unwrap(), AssetKind::Document);
        assert_eq!(parse_kind("transcript").unwrap(), AssetKind::Transcript);
        assert_eq!(parse_kind("dataset").unwrap(), AssetKind::Dataset);
        assert!(parse_kind("mixtape").is_err());
    }
}
