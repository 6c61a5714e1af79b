//! Scripted completion backend shared by the unit tests

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use parley_openai::{ByteStream, ChatRequest, ChatResponse, CompletionBackend, OpenAiError, Result};
use tokio::sync::mpsc;

/// One scripted backend response
pub enum Scripted {
    Reply { content: String, total_tokens: Option<u32> },
    Empty,
    Fail(u16),
    Stream(Vec<String>),
    /// Body chunks released one at a time by the test; ends when the sender drops
    Gated(mpsc::UnboundedReceiver<String>),
}

impl Scripted {
    pub fn reply(content: impl Into<String>) -> Self {
        Self::Reply {
            content: content.into(),
            total_tokens: None,
        }
    }

    pub fn reply_with_usage(content: impl Into<String>, total_tokens: u32) -> Self {
        Self::Reply {
            content: content.into(),
            total_tokens: Some(total_tokens),
        }
    }
}

/// Frame a JSON payload as one SSE data line
pub fn sse(payload: &str) -> String {
    format!("data: {payload}\n\n")
}

/// Backend that replays queued responses and records requests
#[derive(Default)]
pub struct ScriptedBackend {
    script: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<ChatRequest>>,
    delay: Option<Duration>,
}

impl ScriptedBackend {
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn push(&self, scripted: Scripted) {
        self.script.lock().unwrap().push_back(scripted);
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }

    async fn next(&self, request: &ChatRequest) -> Scripted {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.script.lock().unwrap().pop_front().expect("backend script exhausted")
    }

    fn api_error(status: u16) -> OpenAiError {
        OpenAiError::Api {
            status,
            error_type: "server_error".to_owned(),
            message: "scripted failure".to_owned(),
        }
    }
}

#[async_trait]
impl CompletionBackend for ScriptedBackend {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse> {
        match self.next(request).await {
            Scripted::Reply { content, total_tokens } => {
                let usage = total_tokens.map(|total| {
                    serde_json::json!({
                        "completion_tokens": total / 2,
                        "prompt_tokens": total - total / 2,
                        "total_tokens": total,
                    })
                });
                let body = serde_json::json!({
                    "id": "chatcmpl-test",
                    "model": request.model,
                    "choices": [{
                        "index": 0,
                        "message": {"role": "assistant", "content": content},
                        "finish_reason": "stop",
                    }],
                    "usage": usage,
                });
                Ok(serde_json::from_value(body).unwrap())
            }
            Scripted::Empty => Ok(serde_json::from_value(serde_json::json!({"choices": []})).unwrap()),
            Scripted::Fail(status) => Err(Self::api_error(status)),
            Scripted::Stream(_) | Scripted::Gated(_) => panic!("stream scripted for a non-streaming request"),
        }
    }

    async fn complete_stream(&self, request: &ChatRequest) -> Result<ByteStream> {
        match self.next(request).await {
            Scripted::Stream(chunks) => {
                let items: Vec<Result<Bytes>> = chunks.into_iter().map(|c| Ok(Bytes::from(c))).collect();
                Ok(Box::pin(futures::stream::iter(items)))
            }
            Scripted::Gated(rx) => Ok(Box::pin(futures::stream::unfold(rx, |mut rx| async move {
                let chunk = rx.recv().await?;
                Some((Ok::<_, OpenAiError>(Bytes::from(chunk)), rx))
            }))),
            Scripted::Fail(status) => Err(Self::api_error(status)),
            _ => panic!("non-stream scripted for a streaming request"),
        }
    }
}
