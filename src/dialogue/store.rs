//! Session storage, the capability the resolver uses to load and save
//! per-client dialogue state.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::session::Session;

/// How often the sweeper looks for idle sessions.
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Load/save access to sessions by opaque id.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// The session for `id`, or a fresh one if none is stored.
    async fn get(&self, id: &str) -> Session;

    /// Store `session` under `id`, replacing any previous value.
    async fn put(&self, id: &str, session: Session);
}

/// Process-local session store. Sessions vanish on restart.
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, Session>>,
}

impl InMemorySessionStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Whether a session is stored under `id`.
    pub async fn contains(&self, id: &str) -> bool {
        self.sessions.read().await.contains_key(id)
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Drop sessions not seen for longer than `max_idle`. Returns how many
    /// were removed.
    pub async fn prune_idle(&self, max_idle: Duration) -> usize {
        let Some(cutoff) = chrono::Duration::from_std(max_idle)
            .ok()
            .and_then(|idle| Utc::now().checked_sub_signed(idle))
        else {
            return 0;
        };

        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| session.last_seen() >= cutoff);
        let pruned = before - sessions.len();

        if pruned > 0 {
            info!(pruned, remaining = sessions.len(), "Pruned idle sessions");
        }
        pruned
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, id: &str) -> Session {
        match self.sessions.read().await.get(id) {
            Some(session) => session.clone(),
            None => {
                debug!(session_id = %id, "Starting new session");
                Session::new()
            }
        }
    }

    async fn put(&self, id: &str, session: Session) {
        self.sessions.write().await.insert(id.to_string(), session);
    }
}

/// Spawn a background task that prunes idle sessions every minute.
pub fn spawn_session_sweeper(
    store: Arc<InMemorySessionStore>,
    max_idle: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            store.prune_idle(max_idle).await;
        }
    })
}
