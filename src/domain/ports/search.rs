use async_trait::async_trait;

use crate::domain::errors::DomainError;
use crate::domain::{FragmentHit, ResumeChunk, SearchRequest};

/// Scoped semantic search over previously ingested resume chunks. Results
/// come back in rank order as decided by the backend.
#[async_trait]
pub trait FragmentSearch: Send + Sync {
    async fn search(&self, request: &SearchRequest) -> Result<Vec<FragmentHit>, DomainError>;
}

/// Write side of the fragment store, used by ingest only.
#[async_trait]
pub trait FragmentIndex: Send + Sync {
    async fn index(
        &self,
        scope_id: &str,
        relative_path: &str,
        chunks: &[ResumeChunk],
    ) -> Result<(), DomainError>;

    async fn remove_scope(&self, scope_id: &str) -> Result<(), DomainError>;
}

/// Resolves which indexed documents belong to a session's scope.
#[async_trait]
pub trait ScopeIndex: Send + Sync {
    async fn documents_in_scope(&self, scope_id: &str) -> Result<Vec<String>, DomainError>;
}
