use serde::{Deserialize, Serialize};

/// A raw search hit as returned by a fragment search backend, in rank order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FragmentHit {
    pub text: String,
    pub source: String,
    pub score: f32,
}

/// A ranked fragment as consumed by the Core: `position` is the 1-based rank
/// assigned by the retrieval invoker, preserved from the backend ordering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedFragment {
    pub position: usize,
    pub text: String,
    pub source: String,
    pub score: f32,
}

impl RetrievedFragment {
    pub fn from_hit(position: usize, hit: FragmentHit) -> Self {
        Self {
            position,
            text: hit.text,
            source: hit.source,
            score: hit.score,
        }
    }
}

/// Restricts a search to the documents of one scope. A single document
/// degenerates to an equality condition; several form a disjunction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeFilter {
    Equals(String),
    AnyOf(Vec<String>),
}

impl ScopeFilter {
    /// Returns `None` when the scope resolves to zero documents, so callers
    /// must handle the empty scope before a search can even be expressed.
    pub fn from_paths(mut paths: Vec<String>) -> Option<Self> {
        match paths.len() {
            0 => None,
            1 => Some(Self::Equals(paths.remove(0))),
            _ => Some(Self::AnyOf(paths)),
        }
    }

    pub fn paths(&self) -> &[String] {
        match self {
            Self::Equals(path) => std::slice::from_ref(path),
            Self::AnyOf(paths) => paths,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub query: String,
    pub filter: ScopeFilter,
    pub columns: Vec<String>,
    pub limit: usize,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>, filter: ScopeFilter, limit: usize) -> Self {
        Self {
            query: query.into(),
            filter,
            columns: vec!["chunk".to_string()],
            limit,
        }
    }
}
