//! HTTP handlers
//!
//! `GET /sse` opens a push channel, `POST /sse-message` routes a message
//! into one. `GET /` and `GET /_health` describe the service.

use axum::{
    body::Bytes,
    extract::{RawQuery, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    Json,
};
use futures_util::{stream, StreamExt};
use serde::Serialize;
use std::convert::Infallible;

use super::bridge::BridgeError;
use super::session::ServerEvent;
use super::{AppState, SESSION_HEADER};
use crate::tools::facade::HealthReport;

/// Service description
#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub description: &'static str,
    pub sse_endpoint: String,
    pub message_endpoint: String,
}

/// Liveness response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub serper: HealthReport,
}

pub async fn home(State(state): State<AppState>) -> Json<ServiceInfo> {
    Json(ServiceInfo {
        name: "serper-mcp",
        version: env!("CARGO_PKG_VERSION"),
        description: "Web search and page scraping over MCP, backed by the Serper API",
        sse_endpoint: state.sse_path.to_string(),
        message_endpoint: state.message_path.to_string(),
    })
}

/// Liveness plus upstream health; always `200`, the body carries the verdict
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let serper = state.tools.health().await;
    let status = if serper.error.is_none() { "ok" } else { "error" };
    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        serper,
    })
}

/// Open a push channel
pub async fn sse(State(state): State<AppState>) -> Result<Response, BridgeError> {
    let opened = state.bridge.open_session().await?;
    let id = opened.id;

    let mut shutdown = state.shutdown.subscribe();
    let events = stream::unfold(opened.events, |mut events| async move {
        let event = events.recv().await?;
        Some((Ok::<_, Infallible>(to_sse_event(event)), events))
    })
    .take_until(async move {
        let _ = shutdown.wait_for(|stopping| *stopping).await;
    });

    let mut response = Sse::new(events)
        .keep_alive(KeepAlive::new().interval(state.keep_alive))
        .into_response();
    if let Ok(value) = HeaderValue::from_str(id.as_str()) {
        response.headers_mut().insert(SESSION_HEADER, value);
    }
    Ok(response)
}

fn to_sse_event(event: ServerEvent) -> Event {
    match event {
        ServerEvent::Endpoint(url) => Event::default().event("endpoint").data(url),
        ServerEvent::Message(json) => Event::default().event("message").data(json),
    }
}

/// Route one inbound message; the reply arrives on the push channel
pub async fn message(
    State(state): State<AppState>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
    body: Bytes,
) -> Result<(StatusCode, &'static str), BridgeError> {
    let from_query = query.as_deref().and_then(query_session_id);
    let session_id = session_id(&headers, from_query.as_deref());
    match state.bridge.route_message(session_id, &body).await {
        Ok(()) => Ok((StatusCode::ACCEPTED, "Accepted")),
        Err(err) => {
            tracing::warn!(session = ?session_id, "Rejected message: {}", err);
            Err(err)
        }
    }
}

/// Header first, then the `sessionId` query parameter; blank values count as absent
fn session_id<'a>(headers: &'a HeaderMap, from_query: Option<&'a str>) -> Option<&'a str> {
    let from_header = headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty());
    if from_header.is_some() {
        return from_header;
    }

    let from_query = from_query.map(str::trim).filter(|v| !v.is_empty());
    if from_query.is_some() {
        tracing::debug!("Session id taken from the sessionId query parameter (deprecated)");
    }
    from_query
}

/// First non-blank `sessionId` in a raw query string
fn query_session_id(query: &str) -> Option<String> {
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, value)| key == "sessionId" && !value.trim().is_empty())
        .map(|(_, value)| value.into_owned())
}
