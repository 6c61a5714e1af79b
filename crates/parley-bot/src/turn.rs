//! One conversation turn, relayed into a channel

use std::sync::Arc;

use parley_config::RelayConfig;
use parley_conversation::{Conversation, Result, Turn};
use parley_discord::{Batcher, MESSAGE_CAP, Operation, Platform, TypingHeartbeat, chunk_text};

/// A completed turn
///
/// Holding it keeps the next turn in the channel from finalizing.
pub struct Delivered {
    /// Finalized transcript entries of the turn
    pub turn: Turn,
    /// Whether every part of the reply reached the channel
    pub complete: bool,
}

/// Stream the reply into a live-edited message
pub async fn streamed(
    platform: &Arc<dyn Platform>,
    conversation: &Conversation,
    relay: &RelayConfig,
    text: &str,
) -> Result<Delivered> {
    let channel = conversation.channel().clone();
    let typing = TypingHeartbeat::start(platform.clone(), channel.clone(), relay.typing_interval);

    let (fragments, outcome) = conversation.stream(text).await?.into_parts();

    let batch = Batcher::new(platform.clone(), channel.clone(), relay.flush_interval)
        .run(fragments)
        .await;
    typing.stop();

    let turn = outcome.turn().await?;

    let complete = match batch {
        Ok(summary) => {
            tracing::debug!(
                channel_id = %channel,
                created = summary.created,
                edited = summary.edited,
                "reply relayed"
            );
            true
        }
        Err(e) => {
            tracing::error!(channel_id = %channel, operation = %e.operation, error = %e, "reply relay aborted");
            false
        }
    };

    Ok(Delivered { turn, complete })
}

/// Wait for the whole reply and post it in order as static chunks
pub async fn whole(
    platform: &Arc<dyn Platform>,
    conversation: &Conversation,
    relay: &RelayConfig,
    text: &str,
) -> Result<Delivered> {
    let channel = conversation.channel();
    let typing = TypingHeartbeat::start(platform.clone(), channel.clone(), relay.typing_interval);

    let turn = conversation.send_turn(text).await;
    typing.stopped().await;
    let turn = turn?;

    let mut complete = true;
    for chunk in chunk_text(&turn.reply.content, MESSAGE_CAP) {
        if let Err(e) = platform.create_message(channel, chunk).await {
            tracing::error!(
                channel_id = %channel,
                operation = %Operation::CreateMessage,
                error = %e,
                "failed to post reply chunk"
            );
            complete = false;
        }
    }

    Ok(Delivered { turn, complete })
}
