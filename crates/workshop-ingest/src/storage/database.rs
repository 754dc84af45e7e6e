//! SQLite database for asset and chunk storage
//!
//! Provides durable storage for registered assets and their embedded chunks.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::types::{Asset, AssetKind, AssetStatus, Chunk};

/// SQLite-backed store for assets and chunks
pub struct AssetStore {
    conn: Arc<Mutex<Connection>>,
}

impl AssetStore {
    /// Create or open the database at the given path
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)
            .map_err(|e| Error::database(format!("Failed to open database: {}", e)))?;

        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };

        store.migrate()?;
        Ok(store)
    }

    /// Create an in-memory database (for testing)
    #[cfg(test)]
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| Error::database(format!("Failed to open in-memory database: {}", e)))?;

        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };

        store.migrate()?;
        Ok(store)
    }

    /// Run database migrations
    fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock();

        // WAL for concurrent reads while the pipeline writes; foreign keys
        // must be switched on per connection for the cascade to fire.
        conn.execute_batch(
            r#"
            PRAGMA journal_mode=WAL;
            PRAGMA synchronous=NORMAL;
            PRAGMA foreign_keys=ON;
            PRAGMA cache_size=10000;
            PRAGMA temp_store=MEMORY;
        "#,
        )
        .map_err(|e| Error::database(format!("Failed to set pragmas: {}", e)))?;

        conn.execute_batch(
            r#"
            -- Registered source documents
            CREATE TABLE IF NOT EXISTS assets (
                id TEXT PRIMARY KEY,
                workshop_id TEXT NOT NULL,
                name TEXT NOT NULL,
                source_url TEXT NOT NULL,
                kind TEXT NOT NULL,
                status TEXT NOT NULL,
                error_message TEXT,
                chunk_count INTEGER NOT NULL DEFAULT 0,
                blob_name TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_assets_workshop_id ON assets(workshop_id);
            CREATE INDEX IF NOT EXISTS idx_assets_status ON assets(status);

            -- Embedded chunks, replaced wholesale on every ingestion run
            CREATE TABLE IF NOT EXISTS chunks (
                id TEXT PRIMARY KEY,
                asset_id TEXT NOT NULL,
                chunk_index INTEGER NOT NULL,
                content TEXT NOT NULL,
                embedding BLOB NOT NULL,
                created_at TEXT NOT NULL,
                FOREIGN KEY (asset_id) REFERENCES assets(id) ON DELETE CASCADE,
                UNIQUE(asset_id, chunk_index)
            );

            CREATE INDEX IF NOT EXISTS idx_chunks_asset_id ON chunks(asset_id);
        "#,
        )
        .map_err(|e| Error::database(format!("Failed to run migrations: {}", e)))?;

        tracing::info!("Database migrations complete");
        Ok(())
    }

    // ==================== Asset Operations ====================

    /// Insert a newly registered asset
    pub fn insert_asset(&self, asset: &Asset) -> Result<()> {
        let conn = self.conn.lock();

        conn.execute(
            r#"
            INSERT INTO assets (
                id, workshop_id, name, source_url, kind, status,
                error_message, chunk_count, blob_name, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
            params![
                asset.id.to_string(),
                asset.workshop_id,
                asset.name,
                asset.source_url,
                asset.kind.as_str(),
                asset.status.as_str(),
                asset.error_message,
                asset.chunk_count as i64,
                asset.blob_name,
                asset.created_at.to_rfc3339(),
                asset.updated_at.to_rfc3339(),
            ],
        )
        .map_err(|e| Error::database(format!("Failed to insert asset: {}", e)))?;

        Ok(())
    }

    /// Get an asset by ID
    pub fn get_asset(&self, id: Uuid) -> Result<Option<Asset>> {
        let conn = self.conn.lock();

        let mut stmt = conn
            .prepare("SELECT * FROM assets WHERE id = ?1")
            .map_err(|e| Error::database(format!("Failed to prepare query: {}", e)))?;

        let asset = stmt
            .query_row(params![id.to_string()], row_to_asset)
            .optional()
            .map_err(|e| Error::database(format!("Failed to get asset: {}", e)))?;

        Ok(asset)
    }

    /// List assets, optionally filtered to a single workshop
    pub fn list_assets(&self, workshop_id: Option<&str>) -> Result<Vec<Asset>> {
        let conn = self.conn.lock();

        let assets = match workshop_id {
            Some(ws) => {
                let mut stmt = conn
                    .prepare(
                        "SELECT * FROM assets WHERE workshop_id = ?1 ORDER BY created_at DESC",
                    )
                    .map_err(|e| Error::database(format!("Failed to prepare query: {}", e)))?;

                let rows = stmt
                    .query_map(params![ws], row_to_asset)
                    .map_err(|e| Error::database(format!("Failed to list assets: {}", e)))?
                    .filter_map(|r| r.ok())
                    .collect();
                rows
            }
            None => {
                let mut stmt = conn
                    .prepare("SELECT * FROM assets ORDER BY created_at DESC")
                    .map_err(|e| Error::database(format!("Failed to prepare query: {}", e)))?;

                let rows = stmt
                    .query_map([], row_to_asset)
                    .map_err(|e| Error::database(format!("Failed to list assets: {}", e)))?
                    .filter_map(|r| r.ok())
                    .collect();
                rows
            }
        };

        Ok(assets)
    }

    /// Delete an asset; its chunks go with it via the cascade
    pub fn delete_asset(&self, id: Uuid) -> Result<bool> {
        let conn = self.conn.lock();

        let count = conn
            .execute("DELETE FROM assets WHERE id = ?1", params![id.to_string()])
            .map_err(|e| Error::database(format!("Failed to delete asset: {}", e)))?;

        Ok(count > 0)
    }

    /// Mark an asset ready with its final chunk count, clearing any old error
    pub fn mark_ready(&self, id: Uuid, chunk_count: u32) -> Result<()> {
        let conn = self.conn.lock();

        conn.execute(
            r#"
            UPDATE assets SET
                status = 'ready',
                error_message = NULL,
                chunk_count = ?2,
                updated_at = ?3
            WHERE id = ?1
            "#,
            params![
                id.to_string(),
                chunk_count as i64,
                Utc::now().to_rfc3339(),
            ],
        )
        .map_err(|e| Error::database(format!("Failed to mark asset ready: {}", e)))?;

        Ok(())
    }

    /// Mark an asset failed with the failure detail
    pub fn mark_error(&self, id: Uuid, message: &str) -> Result<()> {
        let conn = self.conn.lock();

        conn.execute(
            r#"
            UPDATE assets SET
                status = 'error',
                error_message = ?2,
                updated_at = ?3
            WHERE id = ?1
            "#,
            params![id.to_string(), message, Utc::now().to_rfc3339()],
        )
        .map_err(|e| Error::database(format!("Failed to mark asset failed: {}", e)))?;

        Ok(())
    }

    // ==================== Chunk Operations ====================

    /// Replace all chunks of an asset in a single transaction.
    ///
    /// Either the previous chunks are deleted and every new chunk is
    /// inserted, or the database keeps its old state.
    pub fn replace_chunks(&self, asset_id: Uuid, chunks: &[Chunk]) -> Result<()> {
        let mut conn = self.conn.lock();

        let tx = conn
            .transaction()
            .map_err(|e| Error::database(format!("Failed to begin transaction: {}", e)))?;

        tx.execute(
            "DELETE FROM chunks WHERE asset_id = ?1",
            params![asset_id.to_string()],
        )
        .map_err(|e| Error::database(format!("Failed to clear old chunks: {}", e)))?;

        {
            let mut stmt = tx
                .prepare(
                    r#"
                    INSERT INTO chunks (
                        id, asset_id, chunk_index, content, embedding, created_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                    "#,
                )
                .map_err(|e| Error::database(format!("Failed to prepare statement: {}", e)))?;

            for chunk in chunks {
                stmt.execute(params![
                    chunk.id.to_string(),
                    chunk.asset_id.to_string(),
                    chunk.chunk_index as i64,
                    chunk.content,
                    embedding_to_blob(&chunk.embedding),
                    chunk.created_at.to_rfc3339(),
                ])
                .map_err(|e| Error::database(format!("Failed to insert chunk: {}", e)))?;
            }
        }

        tx.commit()
            .map_err(|e| Error::database(format!("Failed to commit transaction: {}", e)))?;

        Ok(())
    }

    /// Get all chunks of an asset in index order
    pub fn get_chunks(&self, asset_id: Uuid) -> Result<Vec<Chunk>> {
        let conn = self.conn.lock();

        let mut stmt = conn
            .prepare("SELECT * FROM chunks WHERE asset_id = ?1 ORDER BY chunk_index ASC")
            .map_err(|e| Error::database(format!("Failed to prepare query: {}", e)))?;

        let chunks = stmt
            .query_map(params![asset_id.to_string()], row_to_chunk)
            .map_err(|e| Error::database(format!("Failed to list chunks: {}", e)))?
            .filter_map(|r| r.ok())
            .collect();

        Ok(chunks)
    }

    /// Count the stored chunks of an asset without loading them
    pub fn chunk_count(&self, asset_id: Uuid) -> Result<u32> {
        let conn = self.conn.lock();

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM chunks WHERE asset_id = ?1",
                params![asset_id.to_string()],
                |row| row.get(0),
            )
            .map_err(|e| Error::database(format!("Failed to count chunks: {}", e)))?;

        Ok(count as u32)
    }
}

// Helper functions

fn string_to_status(s: &str) -> AssetStatus {
    match s {
        "processing" => AssetStatus::Processing,
        "ready" => AssetStatus::Ready,
        "error" => AssetStatus::Error,
        _ => AssetStatus::Error,
    }
}

fn string_to_kind(s: &str) -> AssetKind {
    match s {
        "document" => AssetKind::Document,
        "transcript" => AssetKind::Transcript,
        "dataset" => AssetKind::Dataset,
        _ => AssetKind::Document,
    }
}

fn embedding_to_blob(embedding: &[f32]) -> Vec<u8> {
    let mut blob = Vec::with_capacity(embedding.len() * 4);
    for value in embedding {
        blob.extend_from_slice(&value.to_le_bytes());
    }
    blob
}

fn blob_to_embedding(blob: &[u8]) -> Vec<f32> {
    blob.chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect()
}

fn parse_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|d| d.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

fn row_to_asset(row: &rusqlite::Row) -> rusqlite::Result<Asset> {
    let id_str: String = row.get(0)?;
    let workshop_id: String = row.get(1)?;
    let name: String = row.get(2)?;
    let source_url: String = row.get(3)?;
    let kind_str: String = row.get(4)?;
    let status_str: String = row.get(5)?;
    let error_message: Option<String> = row.get(6)?;
    let chunk_count: i64 = row.get(7)?;
    let blob_name: Option<String> = row.get(8)?;
    let created_at_str: String = row.get(9)?;
    let updated_at_str: String = row.get(10)?;

    Ok(Asset {
        id: Uuid::parse_str(&id_str).unwrap_or_else(|_| Uuid::new_v4()),
        workshop_id,
        name,
        source_url,
        kind: string_to_kind(&kind_str),
        status: string_to_status(&status_str),
        error_message,
        chunk_count: chunk_count as u32,
        blob_name,
        created_at: parse_timestamp(&created_at_str),
        updated_at: parse_timestamp(&updated_at_str),
    })
}

fn row_to_chunk(row: &rusqlite::Row) -> rusqlite::Result<Chunk> {
    let id_str: String = row.get(0)?;
    let asset_id_str: String = row.get(1)?;
    let chunk_index: i64 = row.get(2)?;
    let content: String = row.get(3)?;
    let embedding_blob: Vec<u8> = row.get(4)?;
    let created_at_str: String = row.get(5)?;

    Ok(Chunk {
        id: Uuid::parse_str(&id_str).unwrap_or_else(|_| Uuid::new_v4()),
        asset_id: Uuid::parse_str(&asset_id_str).unwrap_or_else(|_| Uuid::new_v4()),
        chunk_index: chunk_index as u32,
        content,
        embedding: blob_to_embedding(&embedding_blob),
        created_at: parse_timestamp(&created_at_str),
    })
}
