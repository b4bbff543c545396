// Conversation memory
// Per-session log of chat turns, kept in process for the lifetime of the server


use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

/// Opaque identifier of one conversation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    #[inline]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// A fresh random session id
    #[inline]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One user message and the answer that was returned for it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub input: String,
    pub output: String,
}

impl ConversationTurn {
    #[inline]
    pub fn new(input: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
        }
    }
}

/// Ordered turns per session. Nothing is evicted and nothing survives a restart.
#[derive(Debug, Default)]
pub struct ConversationMemory {
    sessions: RwLock<HashMap<SessionId, Vec<ConversationTurn>>>,
}

impl ConversationMemory {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// All turns of `session`, oldest first
    #[inline]
    pub async fn history(&self, session: &SessionId) -> Vec<ConversationTurn> {
        self.sessions
            .read()
            .await
            .get(session)
            .cloned()
            .unwrap_or_default()
    }

    /// The last `window` turns of `session`, oldest first
    #[inline]
    pub async fn recent(&self, session: &SessionId, window: usize) -> Vec<ConversationTurn> {
        let sessions = self.sessions.read().await;
        let Some(turns) = sessions.get(session) else {
            return Vec::new();
        };

        let start = turns.len().saturating_sub(window);
        turns.get(start..).map(<[_]>::to_vec).unwrap_or_default()
    }

    #[inline]
    pub async fn append(&self, session: &SessionId, turn: ConversationTurn) {
        let mut sessions = self.sessions.write().await;
        let turns = sessions.entry(session.clone()).or_default();
        turns.push(turn);
        debug!("Session {} now has {} turns", session, turns.len());
    }

    /// Forget every turn of `session`
    #[inline]
    pub async fn clear(&self, session: &SessionId) {
        self.sessions.write().await.remove(session);
    }

    #[inline]
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}
