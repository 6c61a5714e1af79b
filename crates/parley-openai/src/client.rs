use std::fmt;

use async_trait::async_trait;
use futures::StreamExt;
use parley_config::OpenAiConfig;
use secrecy::{ExposeSecret, SecretString};
use url::Url;

use crate::backend::{ByteStream, CompletionBackend};
use crate::error::{OpenAiError, Result};
use crate::types::{ChatRequest, ChatResponse};

/// HTTP client for an OpenAI-compatible chat completion API
#[derive(Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    base_url: Url,
    api_key: SecretString,
}

impl fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl OpenAiClient {
    /// Create a client from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built
    pub fn new(config: &OpenAiConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| OpenAiError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
        })
    }

    /// Base URL requests are sent to
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build the chat completions URL
    fn completions_url(&self) -> String {
        let base = self.base_url.as_str().trim_end_matches('/');
        format!("{base}/chat/completions")
    }

    /// Send a chat request and check the response status
    async fn post_chat(&self, request: &ChatRequest) -> Result<reqwest::Response> {
        let response = self
            .http
            .post(self.completions_url())
            .bearer_auth(self.api_key.expose_secret())
            .json(request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(model = %request.model, stream = request.stream, error = %e, "completion request failed");
                OpenAiError::Http(e)
            })?;

        handle_error(response).await
    }
}

#[async_trait]
impl CompletionBackend for OpenAiClient {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let request = ChatRequest {
            stream: false,
            ..request.clone()
        };

        let response = self.post_chat(&request).await?;

        response
            .json()
            .await
            .map_err(|e| OpenAiError::Parse(e.to_string()))
    }

    async fn complete_stream(&self, request: &ChatRequest) -> Result<ByteStream> {
        let request = ChatRequest {
            stream: true,
            ..request.clone()
        };

        let response = self.post_chat(&request).await?;

        let bytes = response.bytes_stream().map(|chunk| chunk.map_err(OpenAiError::Http));

        Ok(Box::pin(bytes))
    }
}

/// Check an HTTP response for errors
async fn handle_error(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let (error_type, message) = parse_error_body(&body);

    tracing::warn!(status = %status, error_type = %error_type, "completion backend returned error");

    Err(OpenAiError::Api {
        status: status.as_u16(),
        error_type,
        message,
    })
}

/// Parse an error response body into (type, message)
fn parse_error_body(body: &str) -> (String, String) {
    let Ok(json) = serde_json::from_str::<serde_json::Value>(body) else {
        return ("unknown".to_owned(), body.to_owned());
    };

    let error = &json["error"];
    let error_type = error["type"].as_str().unwrap_or("unknown").to_owned();
    let message = error["message"].as_str().unwrap_or(body).to_owned();

    (error_type, message)
}
