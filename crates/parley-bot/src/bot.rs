use std::sync::Arc;

use dashmap::DashMap;
use parley_config::{Config, ConversationDefaults, RelayConfig, StorageType};
use parley_conversation::{Conversation, ConversationStore, FileStore, MemoryStore, Settings, StoreError, Turn};
use parley_discord::{ChannelId, DiscordClient, Operation, Platform};
use parley_openai::{CompletionBackend, OpenAiClient};

use crate::event::{Disposition, IncomingMessage};
use crate::turn;

const ONLINE_ANNOUNCEMENT: &str = "online";

/// Behaviour knobs taken from configuration
#[derive(Debug, Clone, Default)]
pub struct BotSettings {
    /// Streaming and pacing
    pub relay: RelayConfig,
    /// Settings for newly created conversations
    pub defaults: ConversationDefaults,
    /// Channel that receives the online announcement
    pub general_channel: Option<ChannelId>,
}

impl From<&Config> for BotSettings {
    fn from(config: &Config) -> Self {
        Self {
            relay: config.relay.clone(),
            defaults: config.conversation.clone(),
            general_channel: config.discord.general_channel.as_deref().map(ChannelId::from),
        }
    }
}

/// Relays channel messages to the completion backend and back
pub struct Bot {
    platform: Arc<dyn Platform>,
    backend: Arc<dyn CompletionBackend>,
    store: Arc<dyn ConversationStore>,
    settings: BotSettings,
    conversations: DashMap<ChannelId, Arc<Conversation>>,
}

impl Bot {
    /// Build the bot and its collaborators from configuration
    pub async fn from_config(config: &Config) -> anyhow::Result<Self> {
        let backend = Arc::new(OpenAiClient::new(&config.openai)?);
        let platform = Arc::new(DiscordClient::new(&config.discord)?);

        let store: Arc<dyn ConversationStore> = match config.storage.storage_type {
            StorageType::Memory => Arc::new(MemoryStore::new()),
            StorageType::File => {
                let path = config
                    .storage
                    .path
                    .clone()
                    .ok_or_else(|| anyhow::anyhow!("file storage requires storage.path"))?;
                Arc::new(FileStore::open(path).await?)
            }
        };

        Ok(Self::new(platform, backend, store, BotSettings::from(config)).await?)
    }

    /// Create the bot, rehydrating every stored conversation
    pub async fn new(
        platform: Arc<dyn Platform>,
        backend: Arc<dyn CompletionBackend>,
        store: Arc<dyn ConversationStore>,
        settings: BotSettings,
    ) -> Result<Self, StoreError> {
        let conversations = DashMap::new();

        for record in store.load_all().await? {
            let channel = record.channel.clone();
            conversations.insert(channel, Arc::new(Conversation::restore(record, backend.clone())));
        }

        tracing::info!(
            conversations = conversations.len(),
            streaming = settings.relay.streaming,
            "bot ready"
        );

        Ok(Self {
            platform,
            backend,
            store,
            settings,
            conversations,
        })
    }

    /// Conversation watched in `channel`, if any
    pub fn conversation(&self, channel: &ChannelId) -> Option<Arc<Conversation>> {
        self.conversations.get(channel).map(|c| c.value().clone())
    }

    /// Every watched channel, sorted
    pub fn watched_channels(&self) -> Vec<ChannelId> {
        let mut channels: Vec<_> = self.conversations.iter().map(|c| c.key().clone()).collect();
        channels.sort();
        channels
    }

    /// Post the online announcement to the general channel
    pub async fn announce_online(&self) {
        let Some(channel) = &self.settings.general_channel else {
            return;
        };

        if let Err(e) = self.platform.create_message(channel, ONLINE_ANNOUNCEMENT).await {
            tracing::error!(
                channel_id = %channel,
                operation = %Operation::CreateMessage,
                error = %e,
                "failed to announce online"
            );
        }
    }

    /// Start watching a newly created channel
    pub async fn on_channel_create(&self, channel: ChannelId) {
        tracing::debug!(channel_id = %channel, handler = "channel_create", "called");

        if self.conversations.contains_key(&channel) {
            tracing::debug!(channel_id = %channel, "channel already watched");
            return;
        }

        let conversation = Conversation::new(
            channel.clone(),
            Settings::from(&self.settings.defaults),
            self.backend.clone(),
        );

        if let Err(e) = self.store.create_conversation(&conversation.snapshot().await).await {
            tracing::error!(channel_id = %channel, handler = "channel_create", error = %e, "failed to store conversation");
            return;
        }

        self.conversations.entry(channel).or_insert_with(|| Arc::new(conversation));
    }

    /// Reply to a message in a watched channel
    pub async fn on_message(&self, message: &IncomingMessage) -> Disposition {
        let channel = &message.channel;

        if message.author_is_bot {
            return Disposition::Ignored;
        }

        let Some(conversation) = self.conversation(channel) else {
            return Disposition::Ignored;
        };

        tracing::debug!(channel_id = %channel, handler = "message_create", "called");

        let relay = &self.settings.relay;
        let result = if relay.streaming {
            turn::streamed(&self.platform, &conversation, relay, &message.content).await
        } else {
            turn::whole(&self.platform, &conversation, relay, &message.content).await
        };

        let delivered = match result {
            Ok(delivered) => delivered,
            Err(e) => {
                tracing::error!(channel_id = %channel, handler = "message_create", error = %e, "turn failed");
                return Disposition::Failed;
            }
        };

        // Stored before the turn is released so storage follows transcript order
        self.persist_turn(channel, &delivered.turn).await;
        drop(delivered.turn);

        if delivered.complete {
            Disposition::Replied
        } else {
            Disposition::DeliveryFailed
        }
    }

    /// Stop watching a deleted channel
    ///
    /// The in-memory conversation is only dropped once storage agrees.
    pub async fn on_channel_delete(&self, channel: &ChannelId) {
        tracing::debug!(channel_id = %channel, handler = "channel_delete", "called");

        match self.store.delete_conversation(channel).await {
            Ok(()) => {
                self.conversations.remove(channel);
            }
            Err(StoreError::NotFound(_)) if !self.conversations.contains_key(channel) => {
                tracing::debug!(channel_id = %channel, "deleted channel was not watched");
            }
            Err(e) => {
                tracing::error!(channel_id = %channel, handler = "channel_delete", error = %e, "failed to delete conversation");
            }
        }
    }

    async fn persist_turn(&self, channel: &ChannelId, turn: &Turn) {
        for message in [&turn.prompt, &turn.reply] {
            if let Err(e) = self.store.insert_message(channel, message).await {
                tracing::error!(channel_id = %channel, role = %message.role, error = %e, "failed to store message");
            }
        }

        if let Err(e) = self.store.update_usage(channel, turn.usage).await {
            tracing::error!(channel_id = %channel, error = %e, "failed to store usage");
        }
    }
}

impl std::fmt::Debug for Bot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bot")
            .field("settings", &self.settings)
            .field("conversations", &self.conversations.len())
            .finish_non_exhaustive()
    }
}
