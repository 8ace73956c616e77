//! Bridges a rig-core `CompletionModel` to our `LlmProvider` trait.

use async_trait::async_trait;
use rig::agent::AgentBuilder;
use rig::completion::{Chat, CompletionModel, Message};

use crate::error::LlmError;
use crate::llm::provider::{
    ChatMessage, CompletionRequest, CompletionResponse, FinishReason, LlmProvider, Role,
};

/// `LlmProvider` backed by a rig-core completion model.
///
/// Each request builds a short-lived agent: the leading system message becomes
/// the preamble, the trailing user message the prompt, and everything between
/// is passed as chat history.
pub struct RigAdapter<M> {
    model: M,
    model_name: String,
    provider: &'static str,
}

impl<M> RigAdapter<M>
where
    M: CompletionModel + 'static,
{
    pub fn new(model: M, model_name: &str, provider: &'static str) -> Self {
        Self {
            model,
            model_name: model_name.to_string(),
            provider,
        }
    }
}

#[async_trait]
impl<M> LlmProvider for RigAdapter<M>
where
    M: CompletionModel + Send + Sync + 'static,
{
    fn model_name(&self) -> &str {
        &self.model_name
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let parts = split_messages(self.provider, request.messages)?;

        let mut builder = AgentBuilder::new(self.model.clone());
        if let Some(ref preamble) = parts.preamble {
            builder = builder.preamble(preamble);
        }
        if let Some(max_tokens) = request.max_tokens {
            builder = builder.max_tokens(u64::from(max_tokens));
        }
        if let Some(temperature) = request.temperature {
            builder = builder.temperature(temperature);
        }
        let agent = builder.build();

        let history: Vec<Message> = parts.history.iter().map(to_rig_message).collect();
        let content = agent
            .chat(Message::user(parts.prompt), history)
            .await
            .map_err(|e| classify_error(self.provider, &e.to_string()))?;

        Ok(CompletionResponse {
            content,
            finish_reason: FinishReason::Stop,
        })
    }
}

/// A message list split into rig's agent shape.
#[derive(Debug)]
struct SplitMessages {
    preamble: Option<String>,
    history: Vec<ChatMessage>,
    prompt: String,
}

fn split_messages(
    provider: &str,
    mut messages: Vec<ChatMessage>,
) -> Result<SplitMessages, LlmError> {
    let prompt = match messages.pop() {
        Some(last) if last.role == Role::User => last.content,
        _ => {
            return Err(LlmError::InvalidResponse {
                provider: provider.to_string(),
                reason: "request must end with a user message".to_string(),
            });
        }
    };

    let preamble = match messages.first() {
        Some(first) if first.role == Role::System => Some(messages.remove(0).content),
        _ => None,
    };

    Ok(SplitMessages {
        preamble,
        history: messages,
        prompt,
    })
}

fn to_rig_message(message: &ChatMessage) -> Message {
    match message.role {
        Role::Assistant => Message::assistant(message.content.clone()),
        // rig history has no system role; mid-conversation system text goes in as user text
        Role::User | Role::System => Message::user(message.content.clone()),
    }
}

/// Map a provider error string onto our error taxonomy.
///
/// rig surfaces HTTP failures as text, so quota and auth conditions are
/// recognized by their status codes and usual wording.
pub(crate) fn classify_error(provider: &str, detail: &str) -> LlmError {
    let lowered = detail.to_lowercase();
    if ["429", "rate limit", "rate_limit", "quota", "too many requests"]
        .iter()
        .any(|needle| lowered.contains(needle))
    {
        return LlmError::RateLimited {
            provider: provider.to_string(),
            retry_after: None,
        };
    }
    if ["401", "unauthorized", "invalid api key", "invalid_api_key"]
        .iter()
        .any(|needle| lowered.contains(needle))
    {
        return LlmError::AuthFailed {
            provider: provider.to_string(),
        };
    }
    LlmError::RequestFailed {
        provider: provider.to_string(),
        reason: detail.to_string(),
    }
}
