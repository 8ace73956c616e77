//! Dialogue resolver. Decides how each utterance is answered.
//!
//! Per session: Fresh → AwaitingName → Active. In Active the utterance goes
//! through the special table, then the predefined table, then the LLM.
//! History bookkeeping differs per branch:
//!
//! | branch       | appended to history        |
//! |--------------|----------------------------|
//! | ask name     | assistant question         |
//! | capture name | user name, assistant greet |
//! | special      | nothing                    |
//! | predefined   | assistant response         |
//! | fallback     | user query, assistant reply|

use std::sync::Arc;

use tracing::debug;

use super::phrases::Phrasebook;
use super::session::{DialoguePhase, HistoryEntry, Session};
use super::store::SessionStore;
use crate::error::ChatError;
use crate::llm::{FallbackResponder, LlmProvider};
use crate::matching::{ResponseTables, best_match, first_above};

/// Scores must be strictly above this to count as a match.
pub const DEFAULT_MATCH_THRESHOLD: u8 = 80;

/// Which path produced a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Branch {
    AskName,
    CaptureName,
    Special,
    Predefined,
    Fallback,
}

impl std::fmt::Display for Branch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::AskName => "ask_name",
            Self::CaptureName => "capture_name",
            Self::Special => "special",
            Self::Predefined => "predefined",
            Self::Fallback => "fallback",
        };
        write!(f, "{s}")
    }
}

/// The reply for one turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub reply: String,
    pub branch: Branch,
}

impl Resolution {
    fn new(reply: impl Into<String>, branch: Branch) -> Self {
        Self {
            reply: reply.into(),
            branch,
        }
    }
}

/// Everything the resolver needs, built once at startup.
pub struct ResolverDeps {
    pub tables: Arc<ResponseTables>,
    pub phrases: Arc<Phrasebook>,
    pub llm: Arc<dyn LlmProvider>,
    pub store: Arc<dyn SessionStore>,
}

/// Orchestrates onboarding, table matching and the LLM fallback.
pub struct DialogueResolver {
    tables: Arc<ResponseTables>,
    phrases: Arc<Phrasebook>,
    fallback: FallbackResponder,
    store: Arc<dyn SessionStore>,
    threshold: u8,
}

impl DialogueResolver {
    pub fn new(deps: ResolverDeps) -> Self {
        Self {
            fallback: FallbackResponder::new(deps.llm, Arc::clone(&deps.phrases)),
            tables: deps.tables,
            phrases: deps.phrases,
            store: deps.store,
            threshold: DEFAULT_MATCH_THRESHOLD,
        }
    }

    pub fn with_threshold(mut self, threshold: u8) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    /// Run one turn for the session stored under `session_id`.
    ///
    /// An empty utterance is rejected before the store is touched. Once
    /// accepted, a turn always produces a reply.
    pub async fn handle(&self, session_id: &str, utterance: &str) -> Result<Resolution, ChatError> {
        if utterance.is_empty() {
            return Err(ChatError::NoQuery);
        }

        let mut session = self.store.get(session_id).await;
        let resolution = self.resolve(&mut session, utterance).await;
        session.touch();
        self.store.put(session_id, session).await;

        debug!(session_id = %session_id, branch = %resolution.branch, "Turn resolved");
        Ok(resolution)
    }

    /// Decide the reply for `utterance` and apply the branch's mutations to
    /// `session`.
    pub async fn resolve(&self, session: &mut Session, utterance: &str) -> Resolution {
        match session.phase() {
            DialoguePhase::Fresh => self.ask_name(session),
            DialoguePhase::AwaitingName => self.capture_name(session, utterance),
            DialoguePhase::Active => self.answer(session, utterance).await,
        }
    }

    fn ask_name(&self, session: &mut Session) -> Resolution {
        let question = self.phrases.ask_name();
        session.mark_name_asked();
        session.record(HistoryEntry::assistant(question));
        Resolution::new(question, Branch::AskName)
    }

    fn capture_name(&self, session: &mut Session, utterance: &str) -> Resolution {
        let greeting = self.phrases.greeting(utterance);
        session.set_name(utterance);
        session.record(HistoryEntry::user(utterance));
        session.record(HistoryEntry::assistant(greeting.clone()));
        Resolution::new(greeting, Branch::CaptureName)
    }

    async fn answer(&self, session: &mut Session, utterance: &str) -> Resolution {
        if first_above(utterance, &self.tables.special, self.threshold).is_some() {
            let reply = match session.name() {
                Some(name) => self.phrases.name_is(name),
                None => self.phrases.name_unknown().to_string(),
            };
            return Resolution::new(reply, Branch::Special);
        }

        let matched = best_match(utterance, &self.tables.predefined);
        if let Some(response) = matched.above(self.threshold) {
            debug!(score = matched.score, "Predefined response matched");
            session.record(HistoryEntry::assistant(response));
            return Resolution::new(response, Branch::Predefined);
        }

        let reply = self
            .fallback
            .generate_reply(utterance, session.history())
            .await;
        session.record(HistoryEntry::user(utterance));
        session.record(HistoryEntry::assistant(reply.clone()));
        Resolution::new(reply, Branch::Fallback)
    }
}
