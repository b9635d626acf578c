use async_trait::async_trait;

/// Blob storage for uploaded profile photos.
#[async_trait]
pub trait PhotoStorage: Send + Sync {
    /// Write `bytes` under `file_name`, which is already sanitized and flat.
    async fn save(&self, file_name: &str, bytes: &[u8]) -> Result<(), StorageError>;
}

/// Photo storage errors.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Storage I/O failed: {0}")]
    Io(String),

    #[error("Invalid file name: {0}")]
    InvalidName(String),
}
