//! Dialogue engine: per-session state, storage and the turn resolver.
//!
//! A new client is asked for their first name, the next utterance is taken as
//! that name, and from then on every utterance is answered from the response
//! tables or, failing a match, by the LLM with the accumulated history.

pub mod phrases;
pub mod resolver;
pub mod session;
pub mod store;

pub use phrases::{Locale, Phrasebook};
pub use resolver::{Branch, DEFAULT_MATCH_THRESHOLD, DialogueResolver, Resolution, ResolverDeps};
pub use session::{DialoguePhase, HistoryEntry, Session, Speaker};
pub use store::{InMemorySessionStore, SessionStore, spawn_session_sweeper};
