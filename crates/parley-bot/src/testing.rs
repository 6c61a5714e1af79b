//! Test doubles for the bot handlers

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use parley_discord::{ChannelId, MessageId, Platform, PlatformError};
use parley_openai::{ByteStream, ChatRequest, ChatResponse, CompletionBackend, OpenAiError};

/// A platform call as observed by [`FakePlatform`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Posted {
    Create { channel: String, content: String },
    Edit { channel: String, id: String, content: String },
}

#[derive(Debug, Default)]
pub struct FakePlatform {
    posts: Mutex<Vec<Posted>>,
    typing: AtomicUsize,
    next_id: AtomicUsize,
    reject_creates: AtomicBool,
    slow_post: Mutex<Option<(String, Duration)>>,
}

impl FakePlatform {
    pub fn posts(&self) -> Vec<Posted> {
        self.posts.lock().unwrap().clone()
    }

    pub fn typing_count(&self) -> usize {
        self.typing.load(Ordering::SeqCst)
    }

    pub fn reject_creates(&self) {
        self.reject_creates.store(true, Ordering::SeqCst);
    }

    /// Delay creating any message with exactly this content
    pub fn slow_post(&self, content: &str, delay: Duration) {
        *self.slow_post.lock().unwrap() = Some((content.to_owned(), delay));
    }
}

#[async_trait]
impl Platform for FakePlatform {
    async fn create_message(&self, channel: &ChannelId, content: &str) -> parley_discord::Result<MessageId> {
        if self.reject_creates.load(Ordering::SeqCst) {
            return Err(PlatformError::Api {
                status: 403,
                code: Some(50013),
                message: "Missing Permissions".to_owned(),
            });
        }

        let delay = self
            .slow_post
            .lock()
            .unwrap()
            .as_ref()
            .filter(|(slow, _)| slow == content)
            .map(|(_, delay)| *delay);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let id = format!("m{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        self.posts.lock().unwrap().push(Posted::Create {
            channel: channel.to_string(),
            content: content.to_owned(),
        });
        Ok(MessageId::new(id))
    }

    async fn edit_message(&self, channel: &ChannelId, message: &MessageId, content: &str) -> parley_discord::Result<()> {
        self.posts.lock().unwrap().push(Posted::Edit {
            channel: channel.to_string(),
            id: message.to_string(),
            content: content.to_owned(),
        });
        Ok(())
    }

    async fn set_typing(&self, _channel: &ChannelId) -> parley_discord::Result<()> {
        self.typing.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Backend answer queued ahead of a request
pub enum Answer {
    Text(String),
    Chunks(Vec<String>),
    Fail,
}

#[derive(Default)]
pub struct FakeBackend {
    answers: Mutex<VecDeque<Answer>>,
}

impl FakeBackend {
    pub fn answer(&self, answer: Answer) {
        self.answers.lock().unwrap().push_back(answer);
    }

    fn next(&self) -> Answer {
        self.answers.lock().unwrap().pop_front().expect("no answer queued")
    }

    fn failure() -> OpenAiError {
        OpenAiError::Api {
            status: 503,
            error_type: "server_error".to_owned(),
            message: "overloaded".to_owned(),
        }
    }
}

/// Frame content deltas as an SSE body ending in `[DONE]`
pub fn sse_body(fragments: &[&str]) -> Vec<String> {
    let mut lines: Vec<String> = fragments
        .iter()
        .map(|f| format!("data: {}\n\n", serde_json::json!({"choices": [{"delta": {"content": f}}]})))
        .collect();
    lines.push("data: [DONE]\n\n".to_owned());
    lines
}

#[async_trait]
impl CompletionBackend for FakeBackend {
    async fn complete(&self, _request: &ChatRequest) -> parley_openai::Result<ChatResponse> {
        match self.next() {
            Answer::Text(text) => Ok(serde_json::from_value(serde_json::json!({
                "choices": [{"message": {"role": "assistant", "content": text}}],
                "usage": {"completion_tokens": 5, "prompt_tokens": 7, "total_tokens": 12},
            }))
            .unwrap()),
            Answer::Fail => Err(Self::failure()),
            Answer::Chunks(_) => panic!("streamed answer queued for a blocking request"),
        }
    }

    async fn complete_stream(&self, _request: &ChatRequest) -> parley_openai::Result<ByteStream> {
        match self.next() {
            Answer::Chunks(chunks) => {
                let items: Vec<parley_openai::Result<Bytes>> = chunks.into_iter().map(|c| Ok(Bytes::from(c))).collect();
                Ok(Box::pin(futures::stream::iter(items)))
            }
            Answer::Fail => Err(Self::failure()),
            Answer::Text(_) => panic!("blocking answer queued for a streamed request"),
        }
    }
}
