pub mod chat;
pub mod condenser;
pub mod ingest;
pub mod insights;
pub mod retrieval;

pub use chat::{ChatService, TurnEvent, TurnPhase};
pub use condenser::QueryCondenser;
pub use ingest::IngestService;
pub use insights::{CandidateInsight, InsightsService, ResumeInsights};
pub use retrieval::RetrievalService;
