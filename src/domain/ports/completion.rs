use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::domain::errors::DomainError;

/// Incremental text deltas from a streaming completion. Concatenating every
/// delta yields the full generated text.
pub type DeltaStream = BoxStream<'static, Result<String, DomainError>>;

#[derive(Debug, Clone, Copy, Default)]
pub struct CompletionOptions {
    pub max_tokens: Option<u64>,
    pub temperature: Option<f64>,
}

#[async_trait]
pub trait CompletionService: Send + Sync {
    async fn complete(&self, model: &str, prompt: &str) -> Result<String, DomainError>;

    async fn complete_with_options(
        &self,
        model: &str,
        prompt: &str,
        options: CompletionOptions,
    ) -> Result<String, DomainError>;

    async fn complete_stream(&self, model: &str, prompt: &str)
        -> Result<DeltaStream, DomainError>;
}
