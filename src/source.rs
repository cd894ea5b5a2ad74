use crate::error::AppError;
use crate::models::CandidatePhoto;
use async_trait::async_trait;

#[async_trait]
pub trait PhotoSource: Send + Sync {
    async fn get_random(&self, query: &str) -> Result<CandidatePhoto, AppError>;
    async fn track_download(&self, location: &str) -> Result<(), AppError>;
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, AppError>;
}
