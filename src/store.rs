use crate::error::AppError;
use async_trait::async_trait;
use std::sync::Arc;

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Returns the named container, creating it if it does not exist yet.
    async fn container(&self, name: &str) -> Result<Arc<dyn Container>, AppError>;
}

#[async_trait]
pub trait Container: Send + Sync {
    fn name(&self) -> &str;
    /// Stores `bytes` under `key`, replacing any previous blob, and returns its public URL.
    async fn write(&self, key: &str, bytes: Vec<u8>) -> Result<String, AppError>;
    /// Fails with `AppError::NotFound` when no blob exists under `key`.
    async fn read(&self, key: &str) -> Result<Vec<u8>, AppError>;
}
