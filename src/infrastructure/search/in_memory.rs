use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::RwLock;

use crate::domain::{
    ports::{FragmentIndex, FragmentSearch, ScopeIndex},
    DomainError, FragmentHit, ResumeChunk, SearchRequest,
};

#[derive(Debug, Clone)]
struct StoredChunk {
    scope_id: String,
    relative_path: String,
    content: String,
}

/// Fragment store for development and tests: keyword-overlap ranking instead
/// of embeddings, same scope-filter semantics as the Qdrant store.
pub struct InMemoryFragmentStore {
    chunks: RwLock<Vec<StoredChunk>>,
}

impl InMemoryFragmentStore {
    pub fn new() -> Self {
        Self {
            chunks: RwLock::new(Vec::new()),
        }
    }
}

impl Default for InMemoryFragmentStore {
    fn default() -> Self {
        Self::new()
    }
}

fn tokens(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect()
}

fn overlap_score(query: &HashSet<String>, content: &str) -> f32 {
    let content_tokens = tokens(content);
    query.intersection(&content_tokens).count() as f32
}

#[async_trait]
impl FragmentSearch for InMemoryFragmentStore {
    async fn search(&self, request: &SearchRequest) -> Result<Vec<FragmentHit>, DomainError> {
        let chunks = self
            .chunks
            .read()
            .map_err(|e| DomainError::internal(e.to_string()))?;

        let allowed: HashSet<&String> = request.filter.paths().iter().collect();
        let query_tokens = tokens(&request.query);

        let mut hits: Vec<FragmentHit> = chunks
            .iter()
            .filter(|c| allowed.contains(&c.relative_path))
            .map(|c| FragmentHit {
                text: c.content.clone(),
                source: c.relative_path.clone(),
                score: overlap_score(&query_tokens, &c.content),
            })
            .collect();

        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        hits.truncate(request.limit);

        Ok(hits)
    }
}

#[async_trait]
impl FragmentIndex for InMemoryFragmentStore {
    async fn index(
        &self,
        scope_id: &str,
        relative_path: &str,
        chunks: &[ResumeChunk],
    ) -> Result<(), DomainError> {
        let mut store = self
            .chunks
            .write()
            .map_err(|e| DomainError::internal(e.to_string()))?;

        store.retain(|c| c.relative_path != relative_path);
        for chunk in chunks {
            store.push(StoredChunk {
                scope_id: scope_id.to_string(),
                relative_path: relative_path.to_string(),
                content: chunk.content.clone(),
            });
        }

        Ok(())
    }

    async fn remove_scope(&self, scope_id: &str) -> Result<(), DomainError> {
        let mut store = self
            .chunks
            .write()
            .map_err(|e| DomainError::internal(e.to_string()))?;

        store.retain(|c| c.scope_id != scope_id);
        Ok(())
    }
}

#[async_trait]
impl ScopeIndex for InMemoryFragmentStore {
    async fn documents_in_scope(&self, scope_id: &str) -> Result<Vec<String>, DomainError> {
        let chunks = self
            .chunks
            .read()
            .map_err(|e| DomainError::internal(e.to_string()))?;

        let mut paths: Vec<String> = Vec::new();
        for chunk in chunks.iter().filter(|c| c.scope_id == scope_id) {
            if !paths.contains(&chunk.relative_path) {
                paths.push(chunk.relative_path.clone());
            }
        }

        Ok(paths)
    }
}
