use std::sync::Arc;

use futures::StreamExt;
use parley_config::ConversationDefaults;
use parley_discord::ChannelId;
use parley_openai::{ChatRequest, CompletionBackend, FragmentStream, Message, Usage, decode};
use tokio::sync::{Mutex, OwnedMutexGuard, mpsc, oneshot};

use crate::error::{ConversationError, Result};
use crate::record::ConversationRecord;

const DEFAULT_NAME: &str = "temp";

/// Per-conversation completion settings
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Display name
    pub name: String,
    /// Model identifier
    pub model: String,
    /// System prompt placed at transcript index 0
    pub system_prompt: String,
    /// Sampling temperature, if set
    pub temperature: Option<f64>,
    /// Choices requested per completion
    pub choices: u32,
}

impl From<&ConversationDefaults> for Settings {
    fn from(defaults: &ConversationDefaults) -> Self {
        Self {
            name: DEFAULT_NAME.to_owned(),
            model: defaults.model.clone(),
            system_prompt: defaults.system_prompt.clone(),
            temperature: defaults.temperature,
            choices: defaults.choices,
        }
    }
}

/// Mutable conversation state, guarded as a whole
#[derive(Debug)]
struct State {
    settings: Settings,
    messages: Vec<Message>,
    usage: Option<Usage>,
}

impl State {
    fn request(&self, stream: bool) -> ChatRequest {
        ChatRequest {
            model: self.settings.model.clone(),
            messages: self.messages.clone(),
            temperature: self.settings.temperature,
            choices: self.settings.choices,
            stream,
        }
    }

    /// Drop the user message of a failed turn
    fn rollback(&mut self, len_before: usize) {
        self.messages.truncate(len_before);
    }
}

/// One channel's transcript and the only way to mutate it
///
/// Every turn holds the conversation lock from the moment the user message
/// is appended until the assistant message is finalized, so turns never
/// interleave. Distinct conversations do not share a lock.
///
/// A finalized turn is handed out as a [`Turn`], which keeps the next turn
/// from finalizing until it is dropped.
pub struct Conversation {
    channel: ChannelId,
    backend: Arc<dyn CompletionBackend>,
    state: Arc<Mutex<State>>,
    /// Held by the most recent undropped [`Turn`]; always taken under `state`
    order: Arc<Mutex<()>>,
}

impl Conversation {
    /// Start a fresh conversation holding only the system prompt
    pub fn new(channel: ChannelId, settings: Settings, backend: Arc<dyn CompletionBackend>) -> Self {
        let messages = vec![Message::system(settings.system_prompt.clone())];

        Self {
            channel,
            backend,
            state: Arc::new(Mutex::new(State {
                settings,
                messages,
                usage: None,
            })),
            order: Arc::default(),
        }
    }

    /// Rehydrate a conversation from its persisted record
    pub fn restore(record: ConversationRecord, backend: Arc<dyn CompletionBackend>) -> Self {
        let settings = Settings {
            name: record.name,
            model: record.model,
            system_prompt: record.system_prompt,
            temperature: record.temperature,
            choices: record.choices,
        };

        let mut messages = record.messages;
        if messages.first().is_none_or(|m| m.role != parley_openai::Role::System) {
            messages.insert(0, Message::system(settings.system_prompt.clone()));
        }

        Self {
            channel: record.channel,
            backend,
            state: Arc::new(Mutex::new(State {
                settings,
                messages,
                usage: record.usage,
            })),
            order: Arc::default(),
        }
    }

    /// Channel this conversation belongs to
    pub const fn channel(&self) -> &ChannelId {
        &self.channel
    }

    /// Run a non-streaming turn and return the reply text
    pub async fn send(&self, text: &str) -> Result<String> {
        self.send_turn(text).await.map(Turn::into_reply)
    }

    /// Run a non-streaming turn and return it finalized
    pub async fn send_turn(&self, text: &str) -> Result<Turn> {
        let mut state = self.state.lock().await;
        let len_before = state.messages.len();

        state.messages.push(Message::user(text));
        let request = state.request(false);

        let response = match self.backend.complete(&request).await {
            Ok(response) => response,
            Err(e) => {
                state.rollback(len_before);
                return Err(e.into());
            }
        };

        let Some(reply) = response.first_content().map(str::to_owned) else {
            state.rollback(len_before);
            return Err(ConversationError::EmptyResponse);
        };

        let order = self.order.clone().lock_owned().await;

        let reply = Message::assistant(reply);
        state.messages.push(reply.clone());
        state.usage = response.usage;

        tracing::debug!(
            channel_id = %self.channel,
            messages = state.messages.len(),
            total_tokens = response.usage.map(|u| u.total_tokens),
            "turn complete"
        );

        Ok(Turn {
            prompt: Message::user(text),
            reply,
            usage: response.usage,
            _order: order,
        })
    }

    /// Run a streaming turn
    ///
    /// Returns once the backend has accepted the request. The conversation
    /// stays locked until the reply stream is exhausted, whether or not the
    /// caller keeps reading fragments.
    pub async fn stream(&self, text: &str) -> Result<ReplyStream> {
        let mut state = self.state.clone().lock_owned().await;
        let len_before = state.messages.len();

        state.messages.push(Message::user(text));
        let request = state.request(true);

        let body = match self.backend.complete_stream(&request).await {
            Ok(body) => body,
            Err(e) => {
                state.rollback(len_before);
                return Err(e.into());
            }
        };

        let (fragments_tx, fragments_rx) = mpsc::unbounded_channel();
        let (outcome_tx, outcome_rx) = oneshot::channel();

        tokio::spawn(relay(
            self.channel.clone(),
            state,
            self.order.clone(),
            Message::user(text),
            len_before,
            decode(body),
            fragments_tx,
            outcome_tx,
        ));

        Ok(ReplyStream {
            fragments: fragments_rx,
            outcome: ReplyOutcome(outcome_rx),
        })
    }

    /// Replace the system prompt
    pub async fn update_prompt(&self, prompt: impl Into<String>) {
        let prompt = prompt.into();
        let mut state = self.state.lock().await;

        match state.messages.first_mut() {
            Some(head) => head.content.clone_from(&prompt),
            None => state.messages.push(Message::system(prompt.clone())),
        }
        state.settings.system_prompt = prompt;
    }

    /// Usage reported by the most recent turn, `None` after a streaming turn
    pub async fn usage(&self) -> Option<Usage> {
        self.state.lock().await.usage
    }

    /// Consistent copy of the conversation for persistence
    ///
    /// Waits for any in-flight turn to finish.
    pub async fn snapshot(&self) -> ConversationRecord {
        let state = self.state.lock().await;

        ConversationRecord {
            channel: self.channel.clone(),
            name: state.settings.name.clone(),
            model: state.settings.model.clone(),
            temperature: state.settings.temperature,
            choices: state.settings.choices,
            system_prompt: state.settings.system_prompt.clone(),
            messages: state.messages.clone(),
            usage: state.usage,
        }
    }
}

impl std::fmt::Debug for Conversation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Conversation").field("channel", &self.channel).finish_non_exhaustive()
    }
}

/// A finalized turn: the message pair appended to the transcript
///
/// While a `Turn` is alive the next turn of the same conversation cannot
/// finalize. Persist it before dropping it and storage follows transcript
/// order. Do not wait on the conversation while holding one.
#[derive(Debug)]
pub struct Turn {
    /// User message that opened the turn
    pub prompt: Message,
    /// Assistant reply that closed it
    pub reply: Message,
    /// Usage reported for this turn, `None` when streamed
    pub usage: Option<Usage>,
    _order: OwnedMutexGuard<()>,
}

impl Turn {
    /// Release the turn, keeping only the reply text
    pub fn into_reply(self) -> String {
        self.reply.content
    }
}

/// Feed decoded fragments to the caller and finalize the transcript
#[allow(clippy::too_many_arguments)]
async fn relay(
    channel: ChannelId,
    mut state: OwnedMutexGuard<State>,
    order: Arc<Mutex<()>>,
    prompt: Message,
    len_before: usize,
    mut fragments: FragmentStream,
    tx: mpsc::UnboundedSender<String>,
    outcome: oneshot::Sender<Result<Turn>>,
) {
    let mut reply = String::new();
    let mut failure = None;

    while let Some(item) = fragments.next().await {
        match item {
            Ok(fragment) => {
                reply.push_str(&fragment);
                // Keep consuming after the receiver goes away so the turn still finalizes
                let _ = tx.send(fragment);
            }
            Err(e) => {
                failure = Some(e);
                break;
            }
        }
    }

    drop(fragments);
    drop(tx);

    let result = match failure {
        Some(e) => {
            tracing::warn!(channel_id = %channel, error = %e, "reply stream failed, turn rolled back");
            state.rollback(len_before);
            Err(ConversationError::from(e))
        }
        None => {
            let order = order.lock_owned().await;
            let reply = Message::assistant(reply);
            state.messages.push(reply.clone());
            state.usage = None;
            tracing::debug!(channel_id = %channel, messages = state.messages.len(), "streamed turn complete");
            Ok(Turn {
                prompt,
                reply,
                usage: None,
                _order: order,
            })
        }
    };

    drop(state);
    let _ = outcome.send(result);
}

/// A streaming reply: ordered fragments plus the final outcome of the turn
#[derive(Debug)]
pub struct ReplyStream {
    fragments: mpsc::UnboundedReceiver<String>,
    outcome: ReplyOutcome,
}

impl ReplyStream {
    /// Split into the fragment receiver and the pending outcome
    ///
    /// The receiver closes when the turn ends, successfully or not.
    pub fn into_parts(self) -> (mpsc::UnboundedReceiver<String>, ReplyOutcome) {
        (self.fragments, self.outcome)
    }

    /// Drain every fragment and return the complete reply
    pub async fn collect(self) -> Result<String> {
        let (mut fragments, outcome) = self.into_parts();
        while fragments.recv().await.is_some() {}
        outcome.wait().await
    }
}

/// Final outcome of a streaming turn
#[derive(Debug)]
pub struct ReplyOutcome(oneshot::Receiver<Result<Turn>>);

impl ReplyOutcome {
    /// Wait for the turn to finish
    ///
    /// Resolves after the transcript has been finalized or rolled back and
    /// the conversation lock released. Yields the full reply on success.
    pub async fn wait(self) -> Result<String> {
        self.turn().await.map(Turn::into_reply)
    }

    /// Wait for the turn to finish and take it finalized
    pub async fn turn(self) -> Result<Turn> {
        self.0.await.unwrap_or(Err(ConversationError::Aborted))
    }
}
