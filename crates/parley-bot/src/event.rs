use parley_discord::ChannelId;

/// A message posted in a channel the bot can see
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    /// Channel the message was posted in
    pub channel: ChannelId,
    /// Whether the author is a bot account
    pub author_is_bot: bool,
    /// Message text
    pub content: String,
}

impl IncomingMessage {
    /// A message from a human author
    pub fn from_user(channel: impl Into<ChannelId>, content: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            author_is_bot: false,
            content: content.into(),
        }
    }
}

/// What the bot did with an incoming message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Authored by a bot or posted in an unwatched channel
    Ignored,
    /// The turn completed and the reply was delivered
    Replied,
    /// The turn completed but some of the reply could not be delivered
    DeliveryFailed,
    /// The completion failed and the transcript was left untouched
    Failed,
}
