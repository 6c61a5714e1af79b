//! Mock Discord REST server for integration tests
//!
//! Records posted and edited messages per channel and typing pings

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use super::config::DISCORD_TOKEN;

/// Channel the mock refuses to post in
pub const FORBIDDEN_CHANNEL: &str = "403";

/// A message as the mock currently holds it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredMessage {
    pub channel: String,
    pub content: String,
    pub edits: usize,
}

/// Mock Discord API
pub struct MockDiscord {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockState>,
}

#[derive(Default)]
struct MockState {
    next_id: AtomicU64,
    typing: AtomicUsize,
    /// Keyed by message id, which increases with creation order
    messages: Mutex<BTreeMap<u64, StoredMessage>>,
}

#[derive(Deserialize)]
struct MessageBody {
    content: String,
}

impl MockDiscord {
    /// Start the mock server, returning immediately
    pub async fn start() -> anyhow::Result<Self> {
        let state = Arc::new(MockState::default());

        let app = Router::new()
            .route("/api/v10/channels/{channel}/messages", routing::post(create_message))
            .route("/api/v10/channels/{channel}/messages/{id}", routing::patch(edit_message))
            .route("/api/v10/channels/{channel}/typing", routing::post(typing))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(Self { addr, shutdown, state })
    }

    /// API base including the version segment
    pub fn api_base(&self) -> String {
        format!("http://{}/api/v10", self.addr)
    }

    /// Messages in `channel`, oldest first
    pub fn messages(&self, channel: &str) -> Vec<StoredMessage> {
        self.state
            .messages
            .lock()
            .unwrap()
            .values()
            .filter(|m| m.channel == channel)
            .cloned()
            .collect()
    }

    /// Contents of the messages in `channel`, oldest first
    pub fn contents(&self, channel: &str) -> Vec<String> {
        self.messages(channel).into_iter().map(|m| m.content).collect()
    }

    /// Typing pings received across all channels
    pub fn typing_count(&self) -> usize {
        self.state.typing.load(Ordering::SeqCst)
    }
}

impl Drop for MockDiscord {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

// -- Handlers --

fn authorized(headers: &HeaderMap) -> bool {
    let expected = format!("Bot {DISCORD_TOKEN}");
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == expected)
}

fn error_response(status: StatusCode, code: u64, message: &str) -> Response {
    (status, Json(serde_json::json!({"message": message, "code": code}))).into_response()
}

/// Reject unauthenticated calls and the forbidden channel
fn check(headers: &HeaderMap, channel: &str) -> Result<(), Response> {
    if !authorized(headers) {
        return Err(error_response(StatusCode::UNAUTHORIZED, 0, "401: Unauthorized"));
    }
    if channel == FORBIDDEN_CHANNEL {
        return Err(error_response(StatusCode::FORBIDDEN, 50013, "Missing Permissions"));
    }
    Ok(())
}

async fn create_message(
    State(state): State<Arc<MockState>>,
    Path(channel): Path<String>,
    headers: HeaderMap,
    Json(body): Json<MessageBody>,
) -> Response {
    if let Err(rejection) = check(&headers, &channel) {
        return rejection;
    }

    let id = state.next_id.fetch_add(1, Ordering::SeqCst) + 1;
    state.messages.lock().unwrap().insert(
        id,
        StoredMessage {
            channel: channel.clone(),
            content: body.content.clone(),
            edits: 0,
        },
    );

    Json(serde_json::json!({
        "id": id.to_string(),
        "channel_id": channel,
        "content": body.content,
    }))
    .into_response()
}

async fn edit_message(
    State(state): State<Arc<MockState>>,
    Path((channel, id)): Path<(String, u64)>,
    headers: HeaderMap,
    Json(body): Json<MessageBody>,
) -> Response {
    if let Err(rejection) = check(&headers, &channel) {
        return rejection;
    }

    let mut messages = state.messages.lock().unwrap();
    let Some(message) = messages.get_mut(&id).filter(|m| m.channel == channel) else {
        return error_response(StatusCode::NOT_FOUND, 10008, "Unknown Message");
    };

    message.content.clone_from(&body.content);
    message.edits += 1;

    Json(serde_json::json!({
        "id": id.to_string(),
        "channel_id": channel,
        "content": body.content,
    }))
    .into_response()
}

async fn typing(State(state): State<Arc<MockState>>, Path(channel): Path<String>, headers: HeaderMap) -> Response {
    if let Err(rejection) = check(&headers, &channel) {
        return rejection;
    }

    state.typing.fetch_add(1, Ordering::SeqCst);
    StatusCode::NO_CONTENT.into_response()
}
