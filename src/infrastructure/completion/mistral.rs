use async_trait::async_trait;
use futures::StreamExt;
use rig::agent::MultiTurnStreamItem;
use rig::client::{CompletionClient, ProviderClient};
use rig::completion::Prompt;
use rig::message::Text;
use rig::providers::mistral;
use rig::streaming::{StreamedAssistantContent, StreamingPrompt};
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::domain::{
    ports::{CompletionOptions, CompletionService, DeltaStream},
    DomainError,
};
use crate::infrastructure::client::ClientCell;

/// Completion adapter over the Mistral API, used for both condensation and
/// streamed answer generation.
pub struct MistralCompletion {
    client: ClientCell<mistral::Client>,
}

impl MistralCompletion {
    pub fn new() -> Self {
        Self {
            client: ClientCell::new(),
        }
    }

    /// Drops the cached client so the next call picks up rotated credentials.
    pub fn invalidate_client(&self) {
        self.client.invalidate();
    }

    fn client(&self) -> Result<Arc<mistral::Client>, DomainError> {
        self.client.get_or_try_init(|| Ok(mistral::Client::from_env()))
    }
}

impl Default for MistralCompletion {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CompletionService for MistralCompletion {
    async fn complete(&self, model: &str, prompt: &str) -> Result<String, DomainError> {
        let agent = self.client()?.agent(model).build();
        agent
            .prompt(prompt)
            .await
            .map_err(|e| DomainError::upstream_generation(e.to_string()))
    }

    async fn complete_with_options(
        &self,
        model: &str,
        prompt: &str,
        options: CompletionOptions,
    ) -> Result<String, DomainError> {
        let client = self.client()?;
        let mut builder = client.agent(model);
        if let Some(temperature) = options.temperature {
            builder = builder.temperature(temperature);
        }
        if let Some(max_tokens) = options.max_tokens {
            builder = builder.max_tokens(max_tokens);
        }

        builder
            .build()
            .prompt(prompt)
            .await
            .map_err(|e| DomainError::upstream_generation(e.to_string()))
    }

    async fn complete_stream(
        &self,
        model: &str,
        prompt: &str,
    ) -> Result<DeltaStream, DomainError> {
        let agent = self.client()?.agent(model).build();
        let prompt = prompt.to_string();
        let (tx, rx) = mpsc::unbounded_channel::<Result<String, DomainError>>();

        tokio::spawn(async move {
            let mut stream = agent.stream_prompt(prompt).await;
            while let Some(item) = stream.next().await {
                let delta = match item {
                    Ok(MultiTurnStreamItem::StreamAssistantItem(StreamedAssistantContent::Text(
                        Text { text },
                    ))) => Ok(text),
                    Ok(_) => continue,
                    Err(e) => Err(DomainError::upstream_generation(e.to_string())),
                };

                let failed = delta.is_err();
                if tx.send(delta).is_err() || failed {
                    break;
                }
            }
        });

        let deltas = futures::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|delta| (delta, rx))
        });

        Ok(deltas.boxed())
    }
}
