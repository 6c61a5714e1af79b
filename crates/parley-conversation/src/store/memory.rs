use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use parley_discord::ChannelId;
use parley_openai::{Message, Usage};

use super::{ConversationStore, Result, StoreError};
use crate::record::ConversationRecord;

/// Process-local store, lost on exit
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: DashMap<ChannelId, ConversationRecord>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored conversations
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Copy of one stored record
    pub fn get(&self, channel: &ChannelId) -> Option<ConversationRecord> {
        self.records.get(channel).map(|r| r.value().clone())
    }
}

#[async_trait]
impl ConversationStore for MemoryStore {
    async fn load_all(&self) -> Result<Vec<ConversationRecord>> {
        let mut records: Vec<_> = self.records.iter().map(|r| r.value().clone()).collect();
        records.sort_by(|a, b| a.channel.cmp(&b.channel));
        Ok(records)
    }

    async fn create_conversation(&self, record: &ConversationRecord) -> Result<()> {
        match self.records.entry(record.channel.clone()) {
            Entry::Occupied(_) => Err(StoreError::AlreadyExists(record.channel.clone())),
            Entry::Vacant(slot) => {
                slot.insert(record.clone());
                Ok(())
            }
        }
    }

    async fn insert_message(&self, channel: &ChannelId, message: &Message) -> Result<()> {
        let mut record = self
            .records
            .get_mut(channel)
            .ok_or_else(|| StoreError::NotFound(channel.clone()))?;
        record.messages.push(message.clone());
        Ok(())
    }

    async fn update_usage(&self, channel: &ChannelId, usage: Option<Usage>) -> Result<()> {
        let mut record = self
            .records
            .get_mut(channel)
            .ok_or_else(|| StoreError::NotFound(channel.clone()))?;
        record.usage = usage;
        Ok(())
    }

    async fn delete_conversation(&self, channel: &ChannelId) -> Result<()> {
        self.records
            .remove(channel)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(channel.clone()))
    }
}
