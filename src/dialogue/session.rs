//! Per-session dialogue state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::llm::ChatMessage;

/// Who said a history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Assistant,
}

/// One recorded message of the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: Speaker,
    pub content: String,
}

impl HistoryEntry {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Speaker::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Speaker::Assistant,
            content: content.into(),
        }
    }
}

impl From<&HistoryEntry> for ChatMessage {
    fn from(entry: &HistoryEntry) -> Self {
        match entry.role {
            Speaker::User => ChatMessage::user(entry.content.clone()),
            Speaker::Assistant => ChatMessage::assistant(entry.content.clone()),
        }
    }
}

/// Where a session stands in the onboarding sequence.
///
/// Progresses linearly: Fresh → AwaitingName → Active. Active is absorbing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialoguePhase {
    Fresh,
    AwaitingName,
    Active,
}

impl std::fmt::Display for DialoguePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Fresh => "fresh",
            Self::AwaitingName => "awaiting_name",
            Self::Active => "active",
        };
        write!(f, "{s}")
    }
}

/// State for one conversing client.
///
/// Fields are private so the onboarding invariants hold: the name is set at
/// most once, only after the question was asked, and history only grows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    onboarding_name_asked: bool,
    name: Option<String>,
    history: Vec<HistoryEntry>,
    last_seen: DateTime<Utc>,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            onboarding_name_asked: false,
            name: None,
            history: Vec::new(),
            last_seen: Utc::now(),
        }
    }
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> DialoguePhase {
        match (self.onboarding_name_asked, &self.name) {
            (false, _) => DialoguePhase::Fresh,
            (true, None) => DialoguePhase::AwaitingName,
            (true, Some(_)) => DialoguePhase::Active,
        }
    }

    pub fn onboarding_name_asked(&self) -> bool {
        self.onboarding_name_asked
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn last_seen(&self) -> DateTime<Utc> {
        self.last_seen
    }

    /// Record that the onboarding question has been asked.
    pub fn mark_name_asked(&mut self) {
        self.onboarding_name_asked = true;
    }

    /// Capture the user's name. Returns `false` (and changes nothing) when the
    /// question was never asked or a name is already stored.
    pub fn set_name(&mut self, name: impl Into<String>) -> bool {
        if !self.onboarding_name_asked || self.name.is_some() {
            return false;
        }
        self.name = Some(name.into());
        true
    }

    /// Append an entry to the history.
    pub fn record(&mut self, entry: HistoryEntry) {
        self.history.push(entry);
    }

    pub(crate) fn touch(&mut self) {
        self.last_seen = Utc::now();
    }

    #[cfg(test)]
    pub(crate) fn set_last_seen(&mut self, at: DateTime<Utc>) {
        self.last_seen = at;
    }
}
