//! Local filesystem photo storage.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use summer_core::ports::{PhotoStorage, StorageError};

/// Writes photos as flat files under a single upload root, which is also
/// the directory served at `/static/uploads`.
#[derive(Debug, Clone)]
pub struct LocalPhotoStorage {
    root: PathBuf,
}

impl LocalPhotoStorage {
    /// Use `root` as the upload directory, creating it if needed.
    pub async fn init(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root)
            .await
            .map_err(|e| StorageError::Io(format!("{}: {e}", root.display())))?;
        tracing::info!(root = %root.display(), "Upload directory ready");
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl PhotoStorage for LocalPhotoStorage {
    async fn save(&self, file_name: &str, bytes: &[u8]) -> Result<(), StorageError> {
        if file_name.is_empty()
            || file_name.starts_with('.')
            || file_name.contains(['/', '\\'])
        {
            return Err(StorageError::InvalidName(file_name.to_string()));
        }

        let path = self.root.join(file_name);
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| StorageError::Io(format!("{}: {e}", path.display())))?;

        tracing::debug!(path = %path.display(), size = bytes.len(), "Photo written");
        Ok(())
    }
}
