use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::error::Operation;
use crate::platform::{ChannelId, Platform};

/// Keeps a channel's typing indicator alive until stopped
///
/// The indicator is refreshed immediately and then once per interval.
/// Dropping the heartbeat stops it, so early returns cannot leak the task.
pub struct TypingHeartbeat {
    token: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl TypingHeartbeat {
    /// Start refreshing the typing indicator in `channel`
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(platform: Arc<dyn Platform>, channel: ChannelId, interval: Duration) -> Self {
        let token = CancellationToken::new();
        let task = tokio::spawn(beat(platform, channel, interval, token.clone()));

        Self {
            token,
            task: Some(task),
        }
    }

    /// Signal the heartbeat to stop without waiting
    ///
    /// No further typing calls are issued once this returns. Idempotent.
    pub fn stop(&self) {
        self.token.cancel();
    }

    /// Stop the heartbeat and wait for its task to exit
    pub async fn stopped(mut self) {
        self.token.cancel();

        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "typing heartbeat task failed");
            }
        }
    }

    /// Whether the heartbeat task is still running
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Drop for TypingHeartbeat {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

async fn beat(platform: Arc<dyn Platform>, channel: ChannelId, interval: Duration, token: CancellationToken) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            () = token.cancelled() => break,
            _ = ticker.tick() => {}
        }

        // An in-flight call is abandoned on cancellation
        let result = tokio::select! {
            biased;
            () = token.cancelled() => break,
            result = platform.set_typing(&channel) => result,
        };

        if let Err(e) = result {
            tracing::warn!(
                channel_id = %channel,
                operation = %Operation::SetTyping,
                error = %e,
                "typing heartbeat stopped"
            );
            break;
        }
    }

    tracing::trace!(channel_id = %channel, "typing heartbeat exited");
}
