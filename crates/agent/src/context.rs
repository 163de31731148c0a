//! Injected per-session context storage. The tracker itself is a plain
//! domain type (`ConversationContext`); this module owns where it lives
//! and how concurrent turns on the same session are serialized.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use consulty_core::domain::analysis::IntentAnalysis;
use consulty_core::domain::session::{ConversationContext, SessionId};

/// Session-context store interface. Injected rather than process-global so
/// tests can substitute their own and deployments can scale horizontally.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, id: &SessionId) -> Option<ConversationContext>;
    async fn put(&self, id: &SessionId, context: ConversationContext);

    /// Fold one turn into the session atomically. Concurrent turns on the
    /// same session must not lose category/entity updates, so
    /// implementations serialize this path.
    async fn absorb_turn(
        &self,
        id: &SessionId,
        analysis: &IntentAnalysis,
        message: &str,
    ) -> ConversationContext;
}

/// Process-local store. Sessions are created lazily on first turn and live
/// for the owning process lifetime; long-term retention belongs to the
/// external session store.
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, ConversationContext>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, id: &SessionId) -> Option<ConversationContext> {
        self.sessions.read().await.get(&id.0).cloned()
    }

    async fn put(&self, id: &SessionId, context: ConversationContext) {
        self.sessions.write().await.insert(id.0.clone(), context);
    }

    async fn absorb_turn(
        &self,
        id: &SessionId,
        analysis: &IntentAnalysis,
        message: &str,
    ) -> ConversationContext {
        let mut sessions = self.sessions.write().await;
        let context = sessions.entry(id.0.clone()).or_default();
        context.absorb(analysis, message);
        context.clone()
    }
}
