use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};

use crate::chunk::{MESSAGE_CAP, chunk_text};
use crate::error::{DeliveryError, Operation, PlatformError};
use crate::platform::{ChannelId, MessageId, Platform};

/// Counts reported when a batch loop finishes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Messages posted
    pub created: usize,
    /// In-place edits issued
    pub edited: usize,
    /// Characters delivered
    pub chars: usize,
}

/// The message currently being extended by edits
struct LiveMessage {
    id: MessageId,
    content: String,
    len: usize,
}

/// Relays text fragments into live-edited platform messages
///
/// Fragments are buffered and flushed on every tick of `flush_interval`.
/// A flush extends the live message in place while it fits under the
/// cap, and otherwise starts a new message holding only the buffered text.
pub struct Batcher {
    platform: Arc<dyn Platform>,
    channel: ChannelId,
    flush_interval: Duration,
    cap: usize,
    live: Option<LiveMessage>,
    buffer: String,
    summary: BatchSummary,
}

impl Batcher {
    /// Create a batcher posting to `channel`
    pub fn new(platform: Arc<dyn Platform>, channel: ChannelId, flush_interval: Duration) -> Self {
        Self {
            platform,
            channel,
            flush_interval,
            cap: MESSAGE_CAP,
            live: None,
            buffer: String::new(),
            summary: BatchSummary::default(),
        }
    }

    /// Override the per-message character cap
    #[must_use]
    pub fn with_cap(mut self, cap: usize) -> Self {
        self.cap = cap.max(1);
        self
    }

    /// Consume fragments until the channel closes
    ///
    /// Performs a final flush after closure. The first platform failure
    /// aborts the loop; messages already posted stay posted.
    pub async fn run(mut self, mut fragments: mpsc::UnboundedReceiver<String>) -> Result<BatchSummary, DeliveryError> {
        let mut ticker = tokio::time::interval_at(Instant::now() + self.flush_interval, self.flush_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                fragment = fragments.recv() => match fragment {
                    Some(text) => self.buffer.push_str(&text),
                    None => break,
                },
                _ = ticker.tick() => self.flush().await?,
            }
        }

        self.flush().await?;

        tracing::debug!(
            channel_id = %self.channel,
            created = self.summary.created,
            edited = self.summary.edited,
            chars = self.summary.chars,
            "batch complete"
        );

        Ok(self.summary)
    }

    /// Deliver the buffered text
    async fn flush(&mut self) -> Result<(), DeliveryError> {
        if self.buffer.is_empty() {
            return Ok(());
        }

        let buffered = std::mem::take(&mut self.buffer);
        let buffered_len = buffered.chars().count();

        match self.live.as_mut() {
            Some(live) if live.len + buffered_len <= self.cap => {
                live.content.push_str(&buffered);
                live.len += buffered_len;

                self.platform
                    .edit_message(&self.channel, &live.id, &live.content)
                    .await
                    .map_err(|e| failure(&self.channel, Operation::EditMessage, e))?;

                self.summary.edited += 1;
                self.summary.chars += buffered_len;
            }
            _ => self.start_new(&buffered).await?,
        }

        Ok(())
    }

    /// Post buffered text as one or more new messages, the last becoming live
    async fn start_new(&mut self, text: &str) -> Result<(), DeliveryError> {
        for piece in chunk_text(text, self.cap) {
            let id = self
                .platform
                .create_message(&self.channel, piece)
                .await
                .map_err(|e| failure(&self.channel, Operation::CreateMessage, e))?;

            let len = piece.chars().count();
            self.summary.created += 1;
            self.summary.chars += len;
            self.live = Some(LiveMessage {
                id,
                content: piece.to_owned(),
                len,
            });
        }

        Ok(())
    }
}

fn failure(channel: &ChannelId, operation: Operation, source: PlatformError) -> DeliveryError {
    tracing::error!(channel_id = %channel, operation = %operation, error = %source, "platform call failed");

    DeliveryError {
        operation,
        channel: channel.clone(),
        source,
    }
}
