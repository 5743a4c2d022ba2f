use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("No documents uploaded or indexed for this session")]
    NoScope,

    #[error("Completion service error: {0}")]
    UpstreamGeneration(String),

    #[error("Search service error: {0}")]
    UpstreamSearch(String),

    #[error("Turn canceled before completion")]
    Canceled,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("External service error: {0}")]
    ExternalService(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn upstream_generation(msg: impl Into<String>) -> Self {
        Self::UpstreamGeneration(msg.into())
    }

    pub fn upstream_search(msg: impl Into<String>) -> Self {
        Self::UpstreamSearch(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn external(msg: impl Into<String>) -> Self {
        Self::ExternalService(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, DomainError>;
