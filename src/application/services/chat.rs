use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tracing::instrument;

use crate::application::context::assemble_context;
use crate::application::prompts::answer_prompt;
use crate::application::services::condenser::QueryCondenser;
use crate::application::services::retrieval::RetrievalService;
use crate::domain::{
    ports::CompletionService, ConversationSession, DomainError, Message, RetrievedFragment,
};

/// Per-turn state machine. Every turn traverses all phases in order; with an
/// empty history the condensation phase is a pass-through, not a skipped
/// state. Any failure returns directly to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnPhase {
    Idle,
    AwaitingCondensation,
    AwaitingRetrieval,
    AwaitingGeneration,
}

/// Events emitted while a turn is in flight. `Delta` chunks concatenate to
/// the committed assistant content.
#[derive(Debug, Clone)]
pub enum TurnEvent {
    Delta(String),
    Completed(Message),
}

/// Orchestrates one user turn: condense, retrieve, assemble context, stream
/// the answer, commit. The session is exclusively owned by the caller for
/// the duration of the turn; no other component appends messages.
pub struct ChatService {
    condenser: QueryCondenser,
    retrieval: Arc<RetrievalService>,
    completion: Arc<dyn CompletionService>,
    response_model: String,
    generation_timeout: Duration,
}

impl ChatService {
    pub fn new(
        condenser: QueryCondenser,
        retrieval: Arc<RetrievalService>,
        completion: Arc<dyn CompletionService>,
        response_model: impl Into<String>,
        generation_timeout: Duration,
    ) -> Self {
        Self {
            condenser,
            retrieval,
            completion,
            response_model: response_model.into(),
            generation_timeout,
        }
    }

    /// Runs one turn to completion. On success the session gains exactly two
    /// messages (user + assistant). On any failure the session is restored
    /// to its pre-turn length and the error surfaces to the caller; there
    /// are no automatic retries.
    #[instrument(skip(self, session, utterance, events), fields(session_id = %session.id))]
    pub async fn process_turn(
        &self,
        session: &mut ConversationSession,
        utterance: &str,
        events: &UnboundedSender<TurnEvent>,
    ) -> Result<Message, DomainError> {
        let utterance = utterance.trim();
        if utterance.is_empty() {
            return Err(DomainError::validation("Message must not be empty"));
        }

        let baseline = session.messages.len();
        session.push(Message::user(utterance));

        match self.run_phases(session, utterance, events).await {
            Ok(message) => Ok(message),
            Err(e) => {
                // Abandoned turn: no partial assistant message, and the
                // uncommitted user message is rolled back with it.
                session.messages.truncate(baseline);
                tracing::warn!(error = %e, "turn failed, session restored");
                Err(e)
            }
        }
    }

    async fn run_phases(
        &self,
        session: &mut ConversationSession,
        utterance: &str,
        events: &UnboundedSender<TurnEvent>,
    ) -> Result<Message, DomainError> {
        let mut phase = TurnPhase::AwaitingCondensation;
        tracing::debug!(?phase, "turn started");

        let history = session.history_window().to_vec();
        let query = self.condenser.condense(&history, utterance).await?;

        phase = TurnPhase::AwaitingRetrieval;
        tracing::debug!(?phase, query_len = query.len(), "query ready");

        let fragments = self.retrieval.retrieve(&session.scope_id, &query).await?;
        let context = assemble_context(&fragments);

        phase = TurnPhase::AwaitingGeneration;
        tracing::debug!(?phase, fragments = fragments.len(), "context assembled");

        let prompt = answer_prompt(&history, &context, utterance);
        let content = tokio::time::timeout(
            self.generation_timeout,
            self.stream_answer(&prompt, events),
        )
        .await
        .map_err(|_| DomainError::upstream_generation("Generation timed out"))??;

        let message = Message::assistant(content).with_source_documents(source_payload(&fragments)?);
        session.push(message.clone());

        let _ = events.send(TurnEvent::Completed(message.clone()));
        phase = TurnPhase::Idle;
        tracing::debug!(?phase, "turn committed");

        Ok(message)
    }

    async fn stream_answer(
        &self,
        prompt: &str,
        events: &UnboundedSender<TurnEvent>,
    ) -> Result<String, DomainError> {
        let mut stream = self
            .completion
            .complete_stream(&self.response_model, prompt)
            .await?;

        let mut answer = String::new();
        while let Some(delta) = stream.next().await {
            let delta = delta?;
            answer.push_str(&delta);
            if events.send(TurnEvent::Delta(delta)).is_err() {
                // Caller abandoned the turn: discard the in-flight response.
                return Err(DomainError::Canceled);
            }
        }

        Ok(answer)
    }
}

fn source_payload(fragments: &[RetrievedFragment]) -> Result<serde_json::Value, DomainError> {
    serde_json::to_value(fragments).map_err(|e| DomainError::internal(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tokio::sync::mpsc;

    use crate::domain::ports::{
        CompletionOptions, DeltaStream, FragmentSearch, ScopeIndex,
    };
    use crate::domain::{FragmentHit, ScopeFilter, SearchRequest};

    struct ScriptedCompletion {
        condensed: String,
        deltas: Vec<Result<String, DomainError>>,
    }

    impl ScriptedCompletion {
        fn new(condensed: &str, deltas: Vec<Result<String, DomainError>>) -> Self {
            Self {
                condensed: condensed.to_string(),
                deltas,
            }
        }
    }

    #[async_trait]
    impl CompletionService for ScriptedCompletion {
        async fn complete(&self, _model: &str, _prompt: &str) -> Result<String, DomainError> {
            Ok(self.condensed.clone())
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
            let deltas: Vec<_> = self
                .deltas
                .iter()
                .map(|d| match d {
                    Ok(s) => Ok(s.clone()),
                    Err(e) => Err(DomainError::upstream_generation(e.to_string())),
                })
                .collect();
            Ok(futures::stream::iter(deltas).boxed())
        }
    }

    struct FixedScope(Vec<String>);

    #[async_trait]
    impl ScopeIndex for FixedScope {
        async fn documents_in_scope(&self, _scope_id: &str) -> Result<Vec<String>, DomainError> {
            Ok(self.0.clone())
        }
    }

    #[derive(Default)]
    struct RecordingSearch {
        calls: AtomicUsize,
        last_filter: Mutex<Option<ScopeFilter>>,
    }

    #[async_trait]
    impl FragmentSearch for RecordingSearch {
        async fn search(&self, request: &SearchRequest) -> Result<Vec<FragmentHit>, DomainError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_filter.lock().unwrap() = Some(request.filter.clone());
            Ok(vec![FragmentHit {
                text: "Alan Susa, 7 years of data engineering".into(),
                source: "resume/2025-01-24/ab12cd34/alan.pdf".into(),
                score: 0.92,
            }])
        }
    }

    fn service_with(
        completion: Arc<ScriptedCompletion>,
        scope_paths: Vec<String>,
        search: Arc<RecordingSearch>,
    ) -> ChatService {
        let condenser = QueryCondenser::new(completion.clone(), "mistral-large-latest");
        let retrieval = RetrievalService::new(Arc::new(FixedScope(scope_paths)), search, 10);
        ChatService::new(
            condenser,
            Arc::new(retrieval),
            completion,
            "mistral-large-latest",
            Duration::from_secs(30),
        )
    }

    fn ok_deltas(parts: &[&str]) -> Vec<Result<String, DomainError>> {
        parts.iter().map(|p| Ok(p.to_string())).collect()
    }

    #[tokio::test]
    async fn first_turn_streams_commits_and_bypasses_condensation() {
        let completion = Arc::new(ScriptedCompletion::new(
            "UNUSED CONDENSED QUERY",
            ok_deltas(&["Alan has ", "7 years ", "of experience."]),
        ));
        let search = Arc::new(RecordingSearch::default());
        let service = service_with(
            completion,
            vec!["resume/2025-01-24/ab12cd34/alan.pdf".into()],
            search.clone(),
        );

        let mut session = ConversationSession::new("resume/2025-01-24/ab12cd34");
        let (tx, mut rx) = mpsc::unbounded_channel();

        let message = service
            .process_turn(&mut session, "What is Alan's experience?", &tx)
            .await
            .unwrap();
        drop(tx);

        // user + assistant committed
        assert_eq!(session.messages.len(), 2);
        assert_eq!(session.messages[0].content, "What is Alan's experience?");
        assert_eq!(message.content, "Alan has 7 years of experience.");
        assert!(message.source_documents.is_some());

        // exactly one search call with a single-equality filter
        assert_eq!(search.calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            search.last_filter.lock().unwrap().clone().unwrap(),
            ScopeFilter::Equals("resume/2025-01-24/ab12cd34/alan.pdf".into())
        );

        // concatenation of deltas equals committed content
        let mut streamed = String::new();
        while let Ok(event) = rx.try_recv() {
            if let TurnEvent::Delta(d) = event {
                streamed.push_str(&d);
            }
        }
        assert_eq!(streamed, message.content);
    }

    #[tokio::test]
    async fn condensation_receives_exactly_the_window() {
        struct WindowAssertingCompletion {
            deltas: Vec<Result<String, DomainError>>,
        }

        #[async_trait]
        impl CompletionService for WindowAssertingCompletion {
            async fn complete(&self, _model: &str, prompt: &str) -> Result<String, DomainError> {
                // last 5 of the 6 prior messages, nothing older
                assert!(!prompt.contains("question 0"));
                for i in 1..=5 {
                    assert!(prompt.contains(&format!("message {i}")), "missing message {i}");
                }
                Ok("condensed".to_string())
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
                let deltas: Vec<_> = self
                    .deltas
                    .iter()
                    .map(|d| match d {
                        Ok(s) => Ok(s.clone()),
                        Err(e) => Err(DomainError::upstream_generation(e.to_string())),
                    })
                    .collect();
                Ok(futures::stream::iter(deltas).boxed())
            }
        }

        let completion = Arc::new(WindowAssertingCompletion {
            deltas: ok_deltas(&["answer"]),
        });
        let condenser = QueryCondenser::new(completion.clone(), "mistral-large-latest");
        let retrieval = RetrievalService::new(
            Arc::new(FixedScope(vec!["a.pdf".into()])),
            Arc::new(RecordingSearch::default()),
            10,
        );
        let service = ChatService::new(
            condenser,
            Arc::new(retrieval),
            completion,
            "mistral-large-latest",
            Duration::from_secs(30),
        );

        let mut session = ConversationSession::new("resume/x");
        session.push(Message::user("question 0"));
        for i in 1..=5 {
            let msg = if i % 2 == 1 {
                Message::assistant(format!("message {i}"))
            } else {
                Message::user(format!("message {i}"))
            };
            session.push(msg);
        }
        assert_eq!(session.messages.len(), 6);

        let (tx, _rx) = mpsc::unbounded_channel();
        service
            .process_turn(&mut session, "and their projects?", &tx)
            .await
            .unwrap();

        assert_eq!(session.messages.len(), 8);
    }

    #[tokio::test]
    async fn mid_stream_failure_leaves_session_unchanged() {
        let completion = Arc::new(ScriptedCompletion::new(
            "condensed",
            vec![
                Ok("partial ".to_string()),
                Err(DomainError::upstream_generation("connection reset")),
            ],
        ));
        let search = Arc::new(RecordingSearch::default());
        let service = service_with(completion, vec!["a.pdf".into()], search);

        let mut session = ConversationSession::new("resume/x");
        session.push(Message::user("earlier question"));
        session.push(Message::assistant("earlier answer"));
        let before = session.messages.len();

        let (tx, _rx) = mpsc::unbounded_channel();
        let err = service
            .process_turn(&mut session, "next question", &tx)
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::UpstreamGeneration(_)));
        assert_eq!(session.messages.len(), before);
    }

    #[tokio::test]
    async fn empty_scope_surfaces_no_scope_and_rolls_back() {
        let completion = Arc::new(ScriptedCompletion::new("condensed", ok_deltas(&["x"])));
        let search = Arc::new(RecordingSearch::default());
        let service = service_with(completion, vec![], search.clone());

        let mut session = ConversationSession::new("resume/empty");
        let (tx, _rx) = mpsc::unbounded_channel();

        let err = service
            .process_turn(&mut session, "anything indexed?", &tx)
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::NoScope));
        assert_eq!(search.calls.load(Ordering::SeqCst), 0);
        assert!(session.messages.is_empty());
    }

    #[tokio::test]
    async fn dropped_receiver_cancels_without_commit() {
        let completion = Arc::new(ScriptedCompletion::new(
            "condensed",
            ok_deltas(&["a", "b", "c"]),
        ));
        let search = Arc::new(RecordingSearch::default());
        let service = service_with(completion, vec!["a.pdf".into()], search);

        let mut session = ConversationSession::new("resume/x");
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);

        let err = service
            .process_turn(&mut session, "question", &tx)
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::Canceled));
        assert!(session.messages.is_empty());
    }

    #[tokio::test]
    async fn blank_utterance_is_rejected_before_any_state_change() {
        let completion = Arc::new(ScriptedCompletion::new("condensed", ok_deltas(&["x"])));
        let search = Arc::new(RecordingSearch::default());
        let service = service_with(completion, vec!["a.pdf".into()], search);

        let mut session = ConversationSession::new("resume/x");
        let (tx, _rx) = mpsc::unbounded_channel();

        let err = service.process_turn(&mut session, "   ", &tx).await.unwrap_err();

        assert!(matches!(err, DomainError::Validation(_)));
        assert!(session.messages.is_empty());
    }
}
