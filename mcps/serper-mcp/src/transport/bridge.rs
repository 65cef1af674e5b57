//! Session transport bridge
//!
//! Opening a session registers two channels in the session table:
//!
//! - inbound: `POST` bodies, decoded into rmcp's typed messages and fed to
//!   an rmcp service that runs the [`SerperMcpServer`] handler
//! - outbound: events pushed down the SSE stream, starting with the
//!   endpoint event and followed by every message the service sends
//!
//! Each session's service reads its inbound queue in acceptance order.
//! Handing a message over never waits: a full queue is reported as busy.
//! A watcher task waits for the SSE side to drop its receiver and then
//! closes the session.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use mcp_common::{
    decode_client_message, encode_server_message, message_kind, MessageError,
    ServerJsonRpcMessage,
};
use rmcp::service::serve_directly;
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::PollSender;

use super::session::{Session, SessionError, SessionId, SessionStore, ServerEvent};
use super::ErrorResponse;
use crate::server::SerperMcpServer;

/// Why an open or route request was refused
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("missing session id (send the X-MCP-Session-ID header)")]
    MissingSessionId,

    #[error("session {0} not found")]
    SessionNotFound(SessionId),

    #[error("session {0} is busy, retry later")]
    SessionBusy(SessionId),

    #[error("invalid message: {0}")]
    InvalidMessage(#[from] MessageError),

    #[error("failed to register session: {0}")]
    Registration(#[from] SessionError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl BridgeError {
    pub fn status(&self) -> StatusCode {
        match self {
            BridgeError::MissingSessionId | BridgeError::InvalidMessage(_) => {
                StatusCode::BAD_REQUEST
            }
            BridgeError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            BridgeError::SessionBusy(_) => StatusCode::SERVICE_UNAVAILABLE,
            BridgeError::Registration(_) | BridgeError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for BridgeError {
    fn into_response(self) -> Response {
        (self.status(), Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

/// A newly opened push channel
pub struct OpenedSession {
    pub id: SessionId,
    /// Events to write to the client, starting with the endpoint event
    pub events: mpsc::Receiver<ServerEvent>,
}

/// Bridges inbound `POST`s into per-session push channels
#[derive(Clone)]
pub struct SessionBridge {
    store: Arc<dyn SessionStore>,
    server: SerperMcpServer,
    message_path: String,
    capacity: usize,
}

impl SessionBridge {
    pub fn new(
        store: Arc<dyn SessionStore>,
        server: SerperMcpServer,
        message_path: impl Into<String>,
        capacity: usize,
    ) -> Self {
        Self {
            store,
            server,
            message_path: message_path.into(),
            capacity: capacity.max(1),
        }
    }

    /// Register a new session and start its service, reply forwarder and
    /// close watcher
    pub async fn open_session(&self) -> Result<OpenedSession, BridgeError> {
        let id = SessionId::generate();
        let (inbound_tx, inbound_rx) = mpsc::channel(self.capacity);
        let (reply_tx, reply_rx) = mpsc::channel::<ServerJsonRpcMessage>(self.capacity);
        let (outbound_tx, outbound_rx) = mpsc::channel(self.capacity);

        let endpoint = format!("{}?sessionId={}", self.message_path, id);
        outbound_tx
            .try_send(ServerEvent::Endpoint(endpoint))
            .map_err(|e| BridgeError::Internal(e.to_string()))?;

        let session = Arc::new(Session {
            id: id.clone(),
            inbound: inbound_tx,
            outbound: outbound_tx.clone(),
        });
        self.store.insert(session).await?;

        let transport = (PollSender::new(reply_tx), ReceiverStream::new(inbound_rx));
        let service = serve_directly(self.server.clone(), transport, None);
        let service_id = id.clone();
        tokio::spawn(async move {
            match service.waiting().await {
                Ok(reason) => tracing::debug!(session = %service_id, ?reason, "Session service stopped"),
                Err(e) => tracing::warn!(session = %service_id, "Session service failed: {}", e),
            }
        });

        tokio::spawn(self.clone().forward_replies(id.clone(), reply_rx, outbound_tx.clone()));
        tokio::spawn(self.clone().watch_disconnect(id.clone(), outbound_tx));

        tracing::info!(session = %id, "Session opened");
        Ok(OpenedSession {
            id,
            events: outbound_rx,
        })
    }

    /// Hand `body` to the session named by `session_id`
    ///
    /// Returns as soon as the message is queued; the response, if any, is
    /// pushed on the session's channel. A session whose queue is full is
    /// reported as busy rather than waited on.
    pub async fn route_message(
        &self,
        session_id: Option<&str>,
        body: &[u8],
    ) -> Result<(), BridgeError> {
        let id = session_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(SessionId::from)
            .ok_or(BridgeError::MissingSessionId)?;

        let session = self
            .store
            .find(&id)
            .await
            .ok_or_else(|| BridgeError::SessionNotFound(id.clone()))?;

        if session.is_closed() {
            self.close_session(&id).await;
            return Err(BridgeError::SessionNotFound(id));
        }

        let message = decode_client_message(body)?;
        tracing::debug!(session = %id, kind = message_kind(&message), "Routing message");

        match session.inbound.try_send(message) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                tracing::warn!(session = %id, "Inbound queue full");
                Err(BridgeError::SessionBusy(id))
            }
            Err(TrySendError::Closed(_)) => {
                self.close_session(&id).await;
                Err(BridgeError::SessionNotFound(id))
            }
        }
    }

    /// Remove a session; closing an unknown or already-closed id is a no-op
    pub async fn close_session(&self, id: &SessionId) -> bool {
        let removed = self.store.remove(id).await.is_some();
        if removed {
            tracing::info!(session = %id, "Session closed");
        }
        removed
    }

    /// Number of registered sessions
    pub async fn session_count(&self) -> usize {
        self.store.len().await
    }

    /// Copy the service's messages onto the push channel, in the order sent
    async fn forward_replies(
        self,
        id: SessionId,
        mut replies: mpsc::Receiver<ServerJsonRpcMessage>,
        outbound: mpsc::Sender<ServerEvent>,
    ) {
        while let Some(message) = replies.recv().await {
            let json = match encode_server_message(&message) {
                Ok(json) => json,
                Err(e) => {
                    tracing::warn!(session = %id, "Failed to serialize message: {}", e);
                    continue;
                }
            };
            if outbound.send(ServerEvent::Message(json)).await.is_err() {
                tracing::debug!(session = %id, "Push channel closed, dropping message");
                break;
            }
        }
        self.close_session(&id).await;
    }

    async fn watch_disconnect(self, id: SessionId, outbound: mpsc::Sender<ServerEvent>) {
        outbound.closed().await;
        tracing::debug!(session = %id, "Client disconnected");
        self.close_session(&id).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::facade::tests::MockApi;
    use crate::transport::session::InMemorySessionStore;
    use serde_json::Value;
    use std::time::Duration;
    use tokio::time::timeout;

    fn bridge_with_capacity(capacity: usize) -> SessionBridge {
        SessionBridge::new(
            Arc::new(InMemorySessionStore::new()),
            SerperMcpServer::new(Arc::new(MockApi::default())),
            "/sse-message",
            capacity,
        )
    }

    fn bridge() -> SessionBridge {
        bridge_with_capacity(8)
    }

    async fn next_event(events: &mut mpsc::Receiver<ServerEvent>) -> ServerEvent {
        timeout(Duration::from_secs(5), events.recv())
            .await
            .expect("timed out waiting for event")
            .expect("channel closed")
    }

    async fn next_message(events: &mut mpsc::Receiver<ServerEvent>) -> Value {
        match next_event(events).await {
            ServerEvent::Message(json) => serde_json::from_str(&json).unwrap(),
            other => panic!("expected message, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_first_event_is_endpoint() {
        let bridge = bridge();
        let mut opened = bridge.open_session().await.unwrap();
        assert_eq!(
            next_event(&mut opened.events).await,
            ServerEvent::Endpoint(format!("/sse-message?sessionId={}", opened.id))
        );
        assert_eq!(bridge.session_count().await, 1);
    }

    #[tokio::test]
    async fn test_route_delivers_response_on_channel() {
        let bridge = bridge();
        let mut opened = bridge.open_session().await.unwrap();
        next_event(&mut opened.events).await;

        bridge
            .route_message(
                Some(opened.id.as_str()),
                br#"{"jsonrpc":"2.0","id":7,"method":"ping"}"#,
            )
            .await
            .unwrap();

        let reply = next_message(&mut opened.events).await;
        assert_eq!(reply["id"], 7);
        assert!(reply["result"].is_object());
    }

    #[tokio::test]
    async fn test_every_request_gets_its_reply() {
        let bridge = bridge();
        let mut opened = bridge.open_session().await.unwrap();
        next_event(&mut opened.events).await;

        for id in 1..=5 {
            let body = format!(r#"{{"jsonrpc":"2.0","id":{},"method":"tools/list"}}"#, id);
            bridge
                .route_message(Some(opened.id.as_str()), body.as_bytes())
                .await
                .unwrap();
        }

        let mut tool_lists = Vec::new();
        let mut ids = Vec::new();
        for _ in 1..=5 {
            let reply = next_message(&mut opened.events).await;
            ids.push(reply["id"].as_i64().unwrap());
            tool_lists.push(reply["result"]["tools"].clone());
        }
        ids.sort_unstable();
        assert_eq!(ids, [1, 2, 3, 4, 5]);
        assert!(tool_lists.iter().all(|tools| *tools == tool_lists[0]));
        assert_eq!(tool_lists[0][0]["name"], "google_search");
    }

    #[tokio::test]
    async fn test_initialize_reports_server_identity() {
        let bridge = bridge();
        let mut opened = bridge.open_session().await.unwrap();
        next_event(&mut opened.events).await;

        let body = br#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2024-11-05","capabilities":{},"clientInfo":{"name":"test","version":"1.0"}}}"#;
        bridge
            .route_message(Some(opened.id.as_str()), body)
            .await
            .unwrap();

        let reply = next_message(&mut opened.events).await;
        assert_eq!(reply["id"], 1);
        assert_eq!(reply["result"]["serverInfo"]["name"], "serper-mcp");
        assert!(reply["result"]["capabilities"]["prompts"].is_object());
    }

    #[tokio::test]
    async fn test_unknown_prompt_is_error_reply() {
        let bridge = bridge();
        let mut opened = bridge.open_session().await.unwrap();
        next_event(&mut opened.events).await;

        bridge
            .route_message(
                Some(opened.id.as_str()),
                br#"{"jsonrpc":"2.0","id":"p","method":"prompts/get","params":{"name":"nope"}}"#,
            )
            .await
            .unwrap();

        let reply = next_message(&mut opened.events).await;
        assert_eq!(reply["id"], "p");
        assert_eq!(reply["error"]["code"], -32602);
    }

    #[tokio::test]
    async fn test_stalled_reader_never_blocks_routing() {
        let bridge = bridge_with_capacity(2);
        let opened = bridge.open_session().await.unwrap();
        let id = Some(opened.id.as_str());

        let mut accepted = 0;
        let mut busy = 0;
        for n in 0..50 {
            let body = format!(r#"{{"jsonrpc":"2.0","id":{},"method":"ping"}}"#, n);
            let outcome = timeout(Duration::from_secs(2), bridge.route_message(id, body.as_bytes()))
                .await
                .unwrap_or_else(|_| panic!("message {} blocked (accepted {})", n, accepted));
            match outcome {
                Ok(()) => accepted += 1,
                Err(err @ BridgeError::SessionBusy(_)) => {
                    assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
                    busy += 1;
                }
                Err(other) => panic!("unexpected error: {}", other),
            }
        }
        assert_eq!(accepted + busy, 50);
        assert!(accepted > 0);
        drop(opened);
    }

    #[tokio::test]
    async fn test_missing_and_blank_id() {
        let bridge = bridge();
        let body = br#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#;
        assert!(matches!(
            bridge.route_message(None, body).await,
            Err(BridgeError::MissingSessionId)
        ));
        assert!(matches!(
            bridge.route_message(Some("  "), body).await,
            Err(BridgeError::MissingSessionId)
        ));
        assert_eq!(bridge.session_count().await, 0);
    }

    #[tokio::test]
    async fn test_unknown_session_is_not_created() {
        let bridge = bridge();
        let err = bridge
            .route_message(Some("nope"), br#"{"jsonrpc":"2.0","method":"ping","id":1}"#)
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(bridge.session_count().await, 0);
    }

    #[tokio::test]
    async fn test_malformed_body_leaves_channel_open() {
        let bridge = bridge();
        let mut opened = bridge.open_session().await.unwrap();
        next_event(&mut opened.events).await;

        let bodies: [&[u8]; 4] = [
            b"not json",
            b"[1,2]",
            b"   ",
            br#"{"id":1,"method":"ping"}"#,
        ];
        for body in bodies {
            let err = bridge
                .route_message(Some(opened.id.as_str()), body)
                .await
                .unwrap_err();
            assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        }
        assert!(opened.events.try_recv().is_err());

        bridge
            .route_message(Some(opened.id.as_str()), br#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#)
            .await
            .unwrap();
        assert_eq!(next_message(&mut opened.events).await["id"], 1);
    }

    #[tokio::test]
    async fn test_notification_produces_no_event() {
        let bridge = bridge();
        let mut opened = bridge.open_session().await.unwrap();
        next_event(&mut opened.events).await;

        let id = Some(opened.id.as_str());
        bridge
            .route_message(id, br#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
            .await
            .unwrap();
        bridge
            .route_message(id, br#"{"jsonrpc":"2.0","id":2,"method":"ping"}"#)
            .await
            .unwrap();
        assert_eq!(next_message(&mut opened.events).await["id"], 2);
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let bridge = bridge();
        let opened = bridge.open_session().await.unwrap();
        assert!(bridge.close_session(&opened.id).await);
        assert!(!bridge.close_session(&opened.id).await);

        let err = bridge
            .route_message(Some(opened.id.as_str()), br#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#)
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::SessionNotFound(_)));
    }

    #[tokio::test]
    async fn test_disconnect_closes_session() {
        let bridge = bridge();
        let opened = bridge.open_session().await.unwrap();
        drop(opened.events);

        timeout(Duration::from_secs(5), async {
            while bridge.session_count().await > 0 {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("session was not closed after disconnect");
    }

    #[tokio::test]
    async fn test_concurrent_opens_get_distinct_ids() {
        let bridge = bridge();
        let (a, b) = tokio::join!(bridge.open_session(), bridge.open_session());
        let (a, b) = (a.unwrap(), b.unwrap());
        assert_ne!(a.id, b.id);
        assert_eq!(bridge.session_count().await, 2);
    }
}
