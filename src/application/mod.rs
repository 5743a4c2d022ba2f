//! Application layer - the conversational retrieval core.
//!
//! Services here orchestrate domain logic through the domain ports (traits)
//! rather than concrete backends: query condensation, scoped retrieval,
//! context assembly, the streaming turn orchestrator, plus resume ingest and
//! auto-generated analytics.

pub mod context;
pub mod prompts;
pub mod services;

pub use context::assemble_context;
pub use services::{
    ChatService, IngestService, InsightsService, QueryCondenser, ResumeInsights,
    RetrievalService, TurnEvent, TurnPhase,
};
