use async_trait::async_trait;

use crate::domain::errors::DomainError;

#[async_trait]
pub trait EmbeddingService: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, DomainError>;
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, DomainError>;
    fn dimension(&self) -> usize;
}
