use std::sync::Arc;
use tracing::instrument;

use crate::application::prompts::condense_prompt;
use crate::domain::{ports::CompletionService, DomainError, Message};

/// Rewrites a follow-up question into a standalone retrieval query using the
/// history window. With no history the utterance passes through unchanged;
/// that bypass is defined behavior, not an error path. A failed completion
/// call propagates as-is rather than falling back to the raw utterance.
pub struct QueryCondenser {
    completion: Arc<dyn CompletionService>,
    model: String,
}

impl QueryCondenser {
    pub fn new(completion: Arc<dyn CompletionService>, model: impl Into<String>) -> Self {
        Self {
            completion,
            model: model.into(),
        }
    }

    #[instrument(skip(self, history, utterance), fields(history_len = history.len()))]
    pub async fn condense(
        &self,
        history: &[Message],
        utterance: &str,
    ) -> Result<String, DomainError> {
        if history.is_empty() {
            tracing::debug!("no chat history, using the utterance as the query");
            return Ok(utterance.to_string());
        }

        let prompt = condense_prompt(history, utterance);
        let raw = self.completion.complete(&self.model, &prompt).await?;
        Ok(strip_wrapping_quotes(&raw))
    }
}

/// Models occasionally wrap the rewritten query in quotes; strip them along
/// with surrounding whitespace.
fn strip_wrapping_quotes(text: &str) -> String {
    text.trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::domain::ports::{CompletionOptions, DeltaStream};

    struct ScriptedCompletion {
        reply: Result<String, DomainError>,
        calls: AtomicUsize,
    }

    impl ScriptedCompletion {
        fn ok(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_string()),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                reply: Err(DomainError::upstream_generation("connection reset")),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl CompletionService for ScriptedCompletion {
        async fn complete(&self, _model: &str, _prompt: &str) -> Result<String, DomainError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.reply {
                Ok(s) => Ok(s.clone()),
                Err(e) => Err(DomainError::upstream_generation(e.to_string())),
            }
        }

        async fn complete_with_options(
            &self,
            model: &str,
            prompt: &str,
            _options: CompletionOptions,
        ) -> Result<String, DomainError> {
            self.complete(model, prompt).await
        }

        async fn complete_stream(
            &self,
            _model: &str,
            _prompt: &str,
        ) -> Result<DeltaStream, DomainError> {
            unimplemented!("condenser never streams")
        }
    }

    #[tokio::test]
    async fn empty_history_is_identity_without_calling_upstream() {
        let completion = Arc::new(ScriptedCompletion::ok("should not be used"));
        let condenser = QueryCondenser::new(completion.clone(), "mistral-large-latest");

        let query = condenser.condense(&[], "What is Alan's experience?").await.unwrap();

        assert_eq!(query, "What is Alan's experience?");
        assert_eq!(completion.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn strips_wrapping_quotes_from_condensed_query() {
        let completion = Arc::new(ScriptedCompletion::ok("  \"Alan Susa's total experience\" "));
        let condenser = QueryCondenser::new(completion, "mistral-large-latest");
        let history = vec![Message::user("Tell me about Alan"), Message::assistant("Alan is...")];

        let query = condenser.condense(&history, "how many years?").await.unwrap();

        assert_eq!(query, "Alan Susa's total experience");
        assert!(!query.starts_with(['"', '\'']));
        assert!(!query.ends_with(['"', '\'']));
    }

    #[tokio::test]
    async fn upstream_failure_propagates_instead_of_falling_back() {
        let completion = Arc::new(ScriptedCompletion::failing());
        let condenser = QueryCondenser::new(completion, "mistral-large-latest");
        let history = vec![Message::user("hi"), Message::assistant("hello")];

        let err = condenser.condense(&history, "follow-up").await.unwrap_err();

        assert!(matches!(err, DomainError::UpstreamGeneration(_)));
    }
}
