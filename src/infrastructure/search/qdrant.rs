use async_trait::async_trait;
use qdrant_client::qdrant::{
    Condition, CreateCollectionBuilder, DeletePointsBuilder, Distance, Filter, PointStruct,
    ScrollPointsBuilder, SearchPointsBuilder, UpsertPointsBuilder, VectorParamsBuilder,
};
use qdrant_client::{Payload, Qdrant};
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::domain::{
    ports::{EmbeddingService, FragmentIndex, FragmentSearch, ScopeIndex},
    DomainError, FragmentHit, ResumeChunk, ScopeFilter, SearchRequest,
};

const SCROLL_PAGE_SIZE: u32 = 256;

/// Scoped fragment store backed by Qdrant. Chunks are embedded on the way in
/// and queries on the way out; scope restriction happens server-side through
/// payload filters on `relative_path`.
pub struct QdrantFragmentStore {
    client: Qdrant,
    collection: String,
    embedding: Arc<dyn EmbeddingService>,
}

impl QdrantFragmentStore {
    pub async fn new(
        url: &str,
        collection: &str,
        embedding: Arc<dyn EmbeddingService>,
    ) -> Result<Self, DomainError> {
        let client = Qdrant::from_url(url)
            .build()
            .map_err(|e| DomainError::external(e.to_string()))?;

        let store = Self {
            client,
            collection: collection.to_string(),
            embedding,
        };

        store.ensure_collection().await?;

        Ok(store)
    }

    async fn ensure_collection(&self) -> Result<(), DomainError> {
        let collections = self
            .client
            .list_collections()
            .await
            .map_err(|e| DomainError::external(e.to_string()))?;

        let exists = collections
            .collections
            .iter()
            .any(|c| c.name == self.collection);

        if !exists {
            self.client
                .create_collection(
                    CreateCollectionBuilder::new(&self.collection).vectors_config(
                        VectorParamsBuilder::new(
                            self.embedding.dimension() as u64,
                            Distance::Cosine,
                        ),
                    ),
                )
                .await
                .map_err(|e| DomainError::external(e.to_string()))?;
        }

        Ok(())
    }

    fn scope_filter(filter: &ScopeFilter) -> Filter {
        match filter {
            ScopeFilter::Equals(path) => {
                Filter::must([Condition::matches("relative_path", path.clone())])
            }
            ScopeFilter::AnyOf(paths) => Filter::should(
                paths
                    .iter()
                    .map(|p| Condition::matches("relative_path", p.clone()))
                    .collect::<Vec<_>>(),
            ),
        }
    }
}

#[async_trait]
impl FragmentSearch for QdrantFragmentStore {
    async fn search(&self, request: &SearchRequest) -> Result<Vec<FragmentHit>, DomainError> {
        let vector = self
            .embedding
            .embed(&request.query)
            .await
            .map_err(|e| DomainError::upstream_search(e.to_string()))?;

        let results = self
            .client
            .search_points(
                SearchPointsBuilder::new(&self.collection, vector, request.limit as u64)
                    .filter(Self::scope_filter(&request.filter))
                    .with_payload(true),
            )
            .await
            .map_err(|e| DomainError::upstream_search(e.to_string()))?;

        let hits = results
            .result
            .into_iter()
            .filter_map(|point| {
                let payload = point.payload;
                let text = payload.get("chunk")?.as_str()?.to_string();
                let source = payload.get("relative_path")?.as_str()?.to_string();
                Some(FragmentHit {
                    text,
                    source,
                    score: point.score,
                })
            })
            .collect();

        Ok(hits)
    }
}

#[async_trait]
impl FragmentIndex for QdrantFragmentStore {
    async fn index(
        &self,
        scope_id: &str,
        relative_path: &str,
        chunks: &[ResumeChunk],
    ) -> Result<(), DomainError> {
        if chunks.is_empty() {
            return Ok(());
        }

        let texts: Vec<&str> = chunks.iter().map(|c| c.content.as_str()).collect();
        let vectors = self.embedding.embed_batch(&texts).await?;

        let mut points = Vec::with_capacity(chunks.len());
        for (chunk, vector) in chunks.iter().zip(vectors) {
            let payload: Payload = serde_json::json!({
                "scope_id": scope_id,
                "relative_path": relative_path,
                "chunk": chunk.content,
                "chunk_index": chunk.chunk_index,
            })
            .try_into()
            .map_err(|_| DomainError::internal("Failed to create payload"))?;

            points.push(PointStruct::new(chunk.id.to_string(), vector, payload));
        }

        self.client
            .upsert_points(UpsertPointsBuilder::new(&self.collection, points))
            .await
            .map_err(|e| DomainError::external(e.to_string()))?;

        Ok(())
    }

    async fn remove_scope(&self, scope_id: &str) -> Result<(), DomainError> {
        let filter = Filter::must([Condition::matches("scope_id", scope_id.to_string())]);

        self.client
            .delete_points(DeletePointsBuilder::new(&self.collection).points(filter))
            .await
            .map_err(|e| DomainError::external(e.to_string()))?;

        Ok(())
    }
}

#[async_trait]
impl ScopeIndex for QdrantFragmentStore {
    async fn documents_in_scope(&self, scope_id: &str) -> Result<Vec<String>, DomainError> {
        let filter = Filter::must([Condition::matches("scope_id", scope_id.to_string())]);
        let mut paths = BTreeSet::new();
        let mut offset = None;

        loop {
            let mut builder = ScrollPointsBuilder::new(&self.collection)
                .filter(filter.clone())
                .limit(SCROLL_PAGE_SIZE)
                .with_payload(true);
            if let Some(offset) = offset.take() {
                builder = builder.offset(offset);
            }

            let page = self
                .client
                .scroll(builder)
                .await
                .map_err(|e| DomainError::upstream_search(e.to_string()))?;

            for point in page.result {
                if let Some(path) = point.payload.get("relative_path").and_then(|v| v.as_str()) {
                    paths.insert(path.to_string());
                }
            }

            match page.next_page_offset {
                Some(next) => offset = Some(next),
                None => break,
            }
        }

        Ok(paths.into_iter().collect())
    }
}
