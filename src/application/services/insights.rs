use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::instrument;

use crate::application::context::assemble_context;
use crate::application::prompts::insights_prompt;
use crate::application::services::retrieval::RetrievalService;
use crate::domain::{
    ports::{CompletionOptions, CompletionService, ScopeIndex},
    DomainError,
};

const INSIGHTS_SEARCH_QUERY: &str =
    "candidate skills, years of experience, projects, and key achievements";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateInsight {
    pub name: String,
    pub experience: u32,
    pub projects: u32,
    pub key_achievements: String,
    pub ai_take: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumeInsights {
    pub total_candidates: u32,
    pub skills: HashMap<String, u32>,
    pub average_experience: f64,
    pub total_projects: u32,
    pub candidates: Vec<CandidateInsight>,
}

/// Generates structured analytics over every resume in a scope: a scoped
/// search seeded with the analytics query, then one low-temperature
/// completion whose output is scrubbed down to the JSON object it carries.
pub struct InsightsService {
    scope: Arc<dyn ScopeIndex>,
    retrieval: Arc<RetrievalService>,
    completion: Arc<dyn CompletionService>,
    model: String,
}

impl InsightsService {
    pub fn new(
        scope: Arc<dyn ScopeIndex>,
        retrieval: Arc<RetrievalService>,
        completion: Arc<dyn CompletionService>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            scope,
            retrieval,
            completion,
            model: model.into(),
        }
    }

    #[instrument(skip(self), fields(scope_id))]
    pub async fn generate(&self, scope_id: &str) -> Result<ResumeInsights, DomainError> {
        let paths = self.scope.documents_in_scope(scope_id).await?;
        let candidate_count = paths.len();

        // One scope listing serves both the candidate count and retrieval.
        let fragments = self
            .retrieval
            .retrieve_within(paths, INSIGHTS_SEARCH_QUERY)
            .await?;
        let context = assemble_context(&fragments);

        let prompt = insights_prompt(candidate_count, &context);
        let options = CompletionOptions {
            max_tokens: Some(10_000),
            temperature: Some(0.01),
        };

        let response = self
            .completion
            .complete_with_options(&self.model, &prompt, options)
            .await?;

        clean_json_response(&response)
    }
}

/// Extracts the JSON object from a model response that may wrap it in code
/// fences or surrounding prose.
fn clean_json_response(response: &str) -> Result<ResumeInsights, DomainError> {
    let fence_open =
        Regex::new(r"```json\s*").map_err(|e| DomainError::internal(e.to_string()))?;
    let fence_close = Regex::new(r"\s*```").map_err(|e| DomainError::internal(e.to_string()))?;

    let response = fence_open.replace_all(response, "");
    let response = fence_close.replace_all(&response, "");
    let response = response.trim();

    let start = response.find('{');
    let end = response.rfind('}');

    let (start, end) = match (start, end) {
        (Some(s), Some(e)) if s < e => (s, e),
        _ => {
            return Err(DomainError::validation(
                "No valid JSON object found in response",
            ))
        }
    };

    serde_json::from_str(&response[start..=end])
        .map_err(|e| DomainError::validation(format!("Invalid JSON structure: {e}")))
}
