use std::fmt;

use async_trait::async_trait;
use parley_config::DiscordConfig;
use reqwest::header::AUTHORIZATION;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{PlatformError, Result};
use crate::platform::{ChannelId, MessageId, Platform};

/// Discord REST API client
#[derive(Clone)]
pub struct DiscordClient {
    http: reqwest::Client,
    api_base: Url,
    token: SecretString,
}

impl fmt::Debug for DiscordClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiscordClient")
            .field("api_base", &self.api_base)
            .finish_non_exhaustive()
    }
}

#[derive(Serialize)]
struct MessageBody<'a> {
    content: &'a str,
}

#[derive(Deserialize)]
struct PostedMessage {
    id: String,
}

impl DiscordClient {
    /// Create a client from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built
    pub fn new(config: &DiscordConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("DiscordBot (parley, ", env!("CARGO_PKG_VERSION"), ")"))
            .build()
            .map_err(|e| PlatformError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            api_base: config.api_base.clone(),
            token: config.token.clone(),
        })
    }

    /// Build a URL below `/channels/{channel}`
    fn channel_url(&self, channel: &ChannelId, path: &str) -> String {
        let base = self.api_base.as_str().trim_end_matches('/');
        format!("{base}/channels/{channel}{path}")
    }

    /// Build an authenticated request
    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, url)
            .header(AUTHORIZATION, format!("Bot {}", self.token.expose_secret()))
    }
}

#[async_trait]
impl Platform for DiscordClient {
    async fn create_message(&self, channel: &ChannelId, content: &str) -> Result<MessageId> {
        let url = self.channel_url(channel, "/messages");

        let response = self
            .request(reqwest::Method::POST, &url)
            .json(&MessageBody { content })
            .send()
            .await?;

        let posted: PostedMessage = handle_error(response)
            .await?
            .json()
            .await
            .map_err(|e| PlatformError::Parse(e.to_string()))?;

        Ok(MessageId::new(posted.id))
    }

    async fn edit_message(&self, channel: &ChannelId, message: &MessageId, content: &str) -> Result<()> {
        let url = self.channel_url(channel, &format!("/messages/{message}"));

        let response = self
            .request(reqwest::Method::PATCH, &url)
            .json(&MessageBody { content })
            .send()
            .await?;

        handle_error(response).await?;
        Ok(())
    }

    async fn set_typing(&self, channel: &ChannelId) -> Result<()> {
        let url = self.channel_url(channel, "/typing");

        let response = self.request(reqwest::Method::POST, &url).send().await?;

        handle_error(response).await?;
        Ok(())
    }
}

/// Check an HTTP response for errors
async fn handle_error(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let (code, message) = parse_error_body(&body);

    Err(PlatformError::Api {
        status: status.as_u16(),
        code,
        message,
    })
}

/// Parse a Discord error body into (code, message)
fn parse_error_body(body: &str) -> (Option<u64>, String) {
    let Ok(json) = serde_json::from_str::<serde_json::Value>(body) else {
        return (None, body.to_owned());
    };

    let code = json["code"].as_u64();
    let message = json["message"].as_str().unwrap_or(body).to_owned();

    (code, message)
}
