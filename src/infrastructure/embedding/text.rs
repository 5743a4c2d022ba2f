use async_trait::async_trait;
use rig::client::{EmbeddingsClient, ProviderClient};
use rig::embeddings::EmbeddingsBuilder;
use rig::providers::openai;
use std::sync::Arc;

use crate::domain::{ports::EmbeddingService, DomainError};
use crate::infrastructure::client::ClientCell;
use crate::infrastructure::config::EmbeddingConfig;

pub struct TextEmbedding {
    client: ClientCell<openai::Client>,
    model: String,
    dimension: usize,
}

impl TextEmbedding {
    pub fn new() -> Self {
        Self {
            client: ClientCell::new(),
            model: "text-embedding-3-small".to_string(),
            dimension: 1536,
        }
    }

    pub fn from_config(config: &EmbeddingConfig) -> Self {
        Self {
            client: ClientCell::new(),
            model: config.model.clone(),
            dimension: config.dimension,
        }
    }

    pub fn invalidate_client(&self) {
        self.client.invalidate();
    }

    fn client(&self) -> Result<Arc<openai::Client>, DomainError> {
        self.client.get_or_try_init(|| Ok(openai::Client::from_env()))
    }
}

impl Default for TextEmbedding {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmbeddingService for TextEmbedding {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, DomainError> {
        let client = self.client()?;
        let model = client.embedding_model(&self.model);

        let embeddings = EmbeddingsBuilder::new(model)
            .document(text)
            .map_err(|e| DomainError::external(e.to_string()))?
            .build()
            .await
            .map_err(|e| DomainError::external(e.to_string()))?;

        embeddings
            .into_iter()
            .next()
            .map(|(_doc, emb)| emb.first().vec.into_iter().map(|x| x as f32).collect())
            .ok_or_else(|| DomainError::internal("No embedding returned"))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, DomainError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let client = self.client()?;
        let model = client.embedding_model(&self.model);

        let mut builder = EmbeddingsBuilder::new(model);
        for text in texts {
            builder = builder
                .document(*text)
                .map_err(|e| DomainError::external(e.to_string()))?;
        }

        let embeddings = builder
            .build()
            .await
            .map_err(|e| DomainError::external(e.to_string()))?;

        Ok(embeddings
            .into_iter()
            .map(|(_doc, emb)| emb.first().vec.into_iter().map(|x| x as f32).collect())
            .collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
