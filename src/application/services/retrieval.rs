use std::sync::Arc;
use tracing::instrument;

use crate::domain::{
    ports::{FragmentSearch, ScopeIndex},
    DomainError, RetrievedFragment, ScopeFilter, SearchRequest,
};

/// Invokes the scoped fragment search. The scope is resolved first; an empty
/// scope is a usage error and no search call is attempted for it.
pub struct RetrievalService {
    scope: Arc<dyn ScopeIndex>,
    search: Arc<dyn FragmentSearch>,
    top_k: usize,
}

impl RetrievalService {
    pub fn new(scope: Arc<dyn ScopeIndex>, search: Arc<dyn FragmentSearch>, top_k: usize) -> Self {
        Self { scope, search, top_k }
    }

    #[instrument(skip(self, query), fields(scope_id))]
    pub async fn retrieve(
        &self,
        scope_id: &str,
        query: &str,
    ) -> Result<Vec<RetrievedFragment>, DomainError> {
        let paths = self.scope.documents_in_scope(scope_id).await?;
        self.retrieve_within(paths, query).await
    }

    /// Same as [`retrieve`](Self::retrieve) but over an already-resolved set
    /// of document paths, for callers that have just listed the scope.
    #[instrument(skip(self, query), fields(documents = paths.len()))]
    pub async fn retrieve_within(
        &self,
        paths: Vec<String>,
        query: &str,
    ) -> Result<Vec<RetrievedFragment>, DomainError> {
        let filter = ScopeFilter::from_paths(paths).ok_or(DomainError::NoScope)?;

        let request = SearchRequest::new(query, filter, self.top_k);
        let hits = self.search.search(&request).await?;

        Ok(hits
            .into_iter()
            .enumerate()
            .map(|(i, hit)| RetrievedFragment::from_hit(i + 1, hit))
            .collect())
    }
}
