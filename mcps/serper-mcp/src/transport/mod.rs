//! HTTP/SSE transport
//!
//! Serves the MCP session bridge over axum: one SSE stream per client for
//! server-to-client messages, and a `POST` endpoint that routes client
//! messages into the right stream by session id.

pub mod auth;
pub mod bridge;
pub mod handlers;
pub mod session;

use anyhow::{bail, Context, Result};
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::Config;
use crate::server::SerperMcpServer;
use crate::tools::SearchTools;

pub use bridge::{BridgeError, OpenedSession, SessionBridge};
pub use session::{InMemorySessionStore, ServerEvent, Session, SessionId, SessionStore};

/// Header carrying the session id on `POST` requests (and on the SSE response)
pub const SESSION_HEADER: &str = "x-mcp-session-id";

/// Path kept for clients that post to the older message endpoint
const LEGACY_MESSAGE_PATH: &str = "/messages";

/// JSON error body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(msg: impl Into<String>) -> Self {
        Self { error: msg.into() }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub bridge: SessionBridge,
    pub tools: SearchTools,
    /// `None` when authentication is disabled
    pub auth_token: Option<Arc<str>>,
    pub sse_path: Arc<str>,
    pub message_path: Arc<str>,
    pub keep_alive: Duration,
    /// Flipped to `true` on shutdown; open SSE streams end when it does
    pub shutdown: Arc<watch::Sender<bool>>,
}

impl AppState {
    pub fn new(
        config: &Config,
        server: SerperMcpServer,
        store: Arc<dyn SessionStore>,
    ) -> Result<Self> {
        let auth_token = if config.auth.enabled {
            match config.auth.token.as_deref().filter(|t| !t.is_empty()) {
                Some(token) => Some(Arc::from(token)),
                None => bail!("authentication is enabled but no token is configured"),
            }
        } else {
            tracing::warn!("Authentication is disabled");
            None
        };

        let tools = server.tools().clone();
        let bridge = SessionBridge::new(
            store,
            server,
            config.server.message_path.clone(),
            config.server.channel_capacity,
        );
        let (shutdown, _) = watch::channel(false);

        Ok(Self {
            bridge,
            tools,
            auth_token,
            sse_path: Arc::from(config.server.sse_path.as_str()),
            message_path: Arc::from(config.server.message_path.as_str()),
            keep_alive: config.server.keep_alive(),
            shutdown: Arc::new(shutdown),
        })
    }

    /// End every open SSE stream
    pub fn begin_shutdown(&self) {
        self.shutdown.send_replace(true);
    }
}

/// Create the router with all routes
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut protected = Router::new()
        .route("/", get(handlers::home))
        .route(&state.sse_path, get(handlers::sse))
        .route(&state.message_path, post(handlers::message));
    if &*state.message_path != LEGACY_MESSAGE_PATH && &*state.sse_path != LEGACY_MESSAGE_PATH {
        protected = protected.route(LEGACY_MESSAGE_PATH, post(handlers::message));
    }
    let protected = protected.route_layer(middleware::from_fn_with_state(
        state.clone(),
        auth::require_bearer,
    ));

    Router::new()
        .route("/_health", get(handlers::health))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP server and run until Ctrl-C
pub async fn serve(config: &Config, server: SerperMcpServer) -> Result<()> {
    let state = AppState::new(config, server, Arc::new(InMemorySessionStore::new()))?;
    let app = router(state.clone());

    let listener =
        tokio::net::TcpListener::bind((config.server.host.as_str(), config.server.port))
            .await
            .with_context(|| format!("failed to bind {}", config.server.bind_address()))?;
    tracing::info!(
        "Listening on http://{} (SSE: {}, messages: {})",
        listener.local_addr()?,
        config.server.sse_path,
        config.server.message_path
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(state))
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal(state: AppState) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
    state.begin_shutdown();
}
