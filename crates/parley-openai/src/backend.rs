use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;

use crate::error::Result;
use crate::types::{ChatRequest, ChatResponse};

/// Raw body of a streamed completion response
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

/// Chat completion service
///
/// Implemented by [`crate::OpenAiClient`] and by test doubles
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Send a non-streaming completion request
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse>;

    /// Send a streaming completion request, returning the raw event-stream body
    async fn complete_stream(&self, request: &ChatRequest) -> Result<ByteStream>;
}
