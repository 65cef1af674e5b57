//! Session table
//!
//! Each open push channel is a [`Session`]: a sender into the session's
//! MCP service (inbound messages) and a sender into the SSE stream
//! (outbound events). The table maps [`SessionId`]s to sessions behind the
//! [`SessionStore`] trait so the bridge can run against any store.

use async_trait::async_trait;
use mcp_common::ClientJsonRpcMessage;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

/// Opaque session identifier handed to the client
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    /// A fresh random identifier
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SessionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Event written to a push channel
#[derive(Debug, Clone, PartialEq)]
pub enum ServerEvent {
    /// Where to POST inbound messages; always the first event
    Endpoint(String),
    /// A serialized JSON-RPC message from the server
    Message(String),
}

/// One live push channel
#[derive(Debug)]
pub struct Session {
    pub id: SessionId,
    pub(crate) inbound: mpsc::Sender<ClientJsonRpcMessage>,
    pub(crate) outbound: mpsc::Sender<ServerEvent>,
}

impl Session {
    /// Whether the client side of the push channel has gone away
    pub fn is_closed(&self) -> bool {
        self.outbound.is_closed()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session {0} is already registered")]
    Duplicate(SessionId),
}

/// Storage for live sessions
///
/// Every operation is atomic with respect to the others.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Register `session`; fails if its id is taken
    async fn insert(&self, session: Arc<Session>) -> Result<(), SessionError>;

    async fn find(&self, id: &SessionId) -> Option<Arc<Session>>;

    /// Remove `id`, returning the session if it was present
    async fn remove(&self, id: &SessionId) -> Option<Arc<Session>>;

    async fn len(&self) -> usize;
}

/// Process-local session table
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<SessionId, Arc<Session>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn insert(&self, session: Arc<Session>) -> Result<(), SessionError> {
        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(&session.id) {
            return Err(SessionError::Duplicate(session.id.clone()));
        }
        sessions.insert(session.id.clone(), session);
        Ok(())
    }

    async fn find(&self, id: &SessionId) -> Option<Arc<Session>> {
        self.sessions.read().await.get(id).cloned()
    }

    async fn remove(&self, id: &SessionId) -> Option<Arc<Session>> {
        self.sessions.write().await.remove(id)
    }

    async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(id: &str) -> Arc<Session> {
        let (inbound, _) = mpsc::channel(1);
        let (outbound, _) = mpsc::channel(1);
        Arc::new(Session {
            id: SessionId::from(id),
            inbound,
            outbound,
        })
    }

    #[test]
    fn test_generated_ids_differ() {
        assert_ne!(SessionId::generate(), SessionId::generate());
    }

    #[tokio::test]
    async fn test_insert_find_remove() {
        let store = InMemorySessionStore::new();
        store.insert(session("a")).await.unwrap();

        assert!(store.find(&SessionId::from("a")).await.is_some());
        assert!(store.find(&SessionId::from("b")).await.is_none());
        assert_eq!(store.len().await, 1);

        assert!(store.remove(&SessionId::from("a")).await.is_some());
        assert!(store.remove(&SessionId::from("a")).await.is_none());
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn test_duplicate_insert_rejected() {
        let store = InMemorySessionStore::new();
        store.insert(session("a")).await.unwrap();
        let err = store.insert(session("a")).await.unwrap_err();
        assert_eq!(err.to_string(), "session a is already registered");
        assert_eq!(store.len().await, 1);
    }

    #[test]
    fn test_dropped_receiver_closes_session() {
        let session = session("a");
        assert!(session.is_closed());
    }
}
