//! LLM fallback, the last resolution tier.
//!
//! Turns an utterance plus the session history into a single completion call
//! and always hands back a reply string. Provider failures are folded into a
//! `FallbackOutcome` and rendered through the phrasebook.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::dialogue::phrases::Phrasebook;
use crate::dialogue::session::HistoryEntry;
use crate::error::LlmError;
use crate::llm::{ChatMessage, CompletionRequest, LlmProvider};

/// What came back from the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackOutcome {
    /// Generated text, trimmed.
    Reply(String),
    /// The provider refused the call for quota or rate-limit reasons.
    QuotaExceeded,
    /// Any other provider-side failure, with its detail.
    ProviderError(String),
}

impl FallbackOutcome {
    pub fn from_result(result: Result<String, LlmError>) -> Self {
        match result {
            Ok(text) => Self::Reply(text.trim().to_string()),
            Err(LlmError::RateLimited { .. }) => Self::QuotaExceeded,
            Err(e) => Self::ProviderError(e.to_string()),
        }
    }

    /// Render the outcome as the text shown to the user.
    pub fn into_reply(self, phrases: &Phrasebook) -> String {
        match self {
            Self::Reply(text) => text,
            Self::QuotaExceeded => phrases.quota_exceeded().to_string(),
            Self::ProviderError(detail) => phrases.provider_error(&detail),
        }
    }
}

/// Calls the LLM on behalf of the dialogue resolver.
pub struct FallbackResponder {
    llm: Arc<dyn LlmProvider>,
    phrases: Arc<Phrasebook>,
}

impl FallbackResponder {
    pub fn new(llm: Arc<dyn LlmProvider>, phrases: Arc<Phrasebook>) -> Self {
        Self { llm, phrases }
    }

    /// Build the message sequence sent to the provider: the system
    /// instruction, the prior history in order, then the new utterance.
    pub fn build_messages(&self, query: &str, history: &[HistoryEntry]) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage::system(self.phrases.system_prompt()));
        messages.extend(history.iter().map(ChatMessage::from));
        messages.push(ChatMessage::user(query));
        messages
    }

    /// Ask the provider for a reply and classify the result.
    pub async fn generate(&self, query: &str, history: &[HistoryEntry]) -> FallbackOutcome {
        let request = CompletionRequest::new(self.build_messages(query, history));
        debug!(
            model = %self.llm.model_name(),
            history_len = history.len(),
            "Requesting fallback completion"
        );

        let result = self.llm.complete(request).await.map(|r| r.content);
        if let Err(ref e) = result {
            warn!(model = %self.llm.model_name(), error = %e, "Fallback completion failed");
        }
        FallbackOutcome::from_result(result)
    }

    /// Same as [`generate`](Self::generate) but rendered to a string. Never fails.
    pub async fn generate_reply(&self, query: &str, history: &[HistoryEntry]) -> String {
        self.generate(query, history).await.into_reply(&self.phrases)
    }
}
