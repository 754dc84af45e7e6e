//! Local blob storage for uploaded asset files

use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::error::Result;

/// Flat directory of uploaded files, served back over HTTP
pub struct BlobStore {
    root: PathBuf,
}

impl BlobStore {
    /// Create the store, making the directory if needed
    pub fn new<P: Into<PathBuf>>(root: P) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Store bytes under a collision-free name derived from the filename
    pub fn store(&self, filename: &str, data: &[u8]) -> Result<String> {
        let blob_name = format!("{}-{}", Uuid::new_v4(), sanitize_filename(filename));
        std::fs::write(self.root.join(&blob_name), data)?;
        Ok(blob_name)
    }

    /// Remove a stored blob; a missing file is not an error
    pub fn remove(&self, blob_name: &str) -> Result<()> {
        match std::fs::remove_file(self.path(blob_name)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Full path of a stored blob
    pub fn path(&self, blob_name: &str) -> PathBuf {
        self.root.join(blob_name)
    }

    /// Directory the blobs live in
    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Keep letters, digits, dots, dashes, and underscores; everything else
/// becomes an underscore so the name stays a single path component
fn sanitize_filename(filename: &str) -> String {
    let cleaned: String = filename
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}
