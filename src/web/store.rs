//! Upload storage: unique names inside a single directory.

use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

/// Directory that receives uploads, one file per request.
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

/// A file written by [`UploadStore::save`].
#[derive(Debug, Clone)]
pub struct StoredUpload {
    /// Storage name (`{uuid}{ext}`), also the `/uploads/{name}` path segment.
    pub name: String,
    pub path: PathBuf,
}

impl StoredUpload {
    pub fn is_pdf(&self) -> bool {
        self.name.ends_with(".pdf")
    }
}

impl UploadStore {
    /// Open the store, creating the directory if needed.
    pub async fn open(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Storage name for a client filename: a fresh v4 UUID followed by the
    /// lowercased extension of `original` (nothing if it has none).
    pub fn storage_name(original: &str) -> String {
        let ext = Path::new(original)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e.to_lowercase()))
            .unwrap_or_default();
        format!("{}{}", Uuid::new_v4(), ext)
    }

    /// Persist `bytes` under a new storage name derived from `original`.
    pub async fn save(&self, original: &str, bytes: &[u8]) -> io::Result<StoredUpload> {
        let name = Self::storage_name(original);
        let path = self.dir.join(&name);
        tokio::fs::write(&path, bytes).await?;
        debug!("Stored upload '{}' as {} ({} bytes)", original, name, bytes.len());
        Ok(StoredUpload { name, path })
    }
}
