use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parley_discord::ChannelId;
use parley_openai::{Message, Usage};
use tokio::sync::Mutex;

use super::{ConversationStore, Result, StoreError};
use crate::record::ConversationRecord;

const EXTENSION: &str = "json";

/// One JSON document per channel in a directory
///
/// Every write replaces the whole document through a temporary file and a
/// rename, so a crash never leaves a half-written transcript behind.
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
    // Serializes read-modify-write cycles
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Open a store rooted at `dir`, creating the directory if needed
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();

        tokio::fs::create_dir_all(&dir).await.map_err(|source| StoreError::Io {
            path: dir.clone(),
            source,
        })?;

        tracing::debug!(path = %dir.display(), "opened conversation store");

        Ok(Self {
            dir,
            write_lock: Mutex::new(()),
        })
    }

    /// Directory holding the documents
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn document_path(&self, channel: &ChannelId) -> Result<PathBuf> {
        let id = channel.as_str();
        let valid = !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

        if !valid {
            return Err(StoreError::InvalidChannel(id.to_owned()));
        }

        Ok(self.dir.join(format!("{id}.{EXTENSION}")))
    }

    async fn read(path: &Path) -> Result<ConversationRecord> {
        let raw = tokio::fs::read(path).await.map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_slice(&raw).map_err(|source| StoreError::Serde {
            path: path.to_path_buf(),
            source,
        })
    }

    async fn write(path: &Path, record: &ConversationRecord) -> Result<()> {
        let raw = serde_json::to_vec_pretty(record).map_err(|source| StoreError::Serde {
            path: path.to_path_buf(),
            source,
        })?;

        let temp = path.with_extension("json.tmp");
        let io_err = |source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        };

        tokio::fs::write(&temp, &raw).await.map_err(io_err)?;
        tokio::fs::rename(&temp, path).await.map_err(io_err)
    }

    /// Load, modify and rewrite one document
    async fn update<F>(&self, channel: &ChannelId, apply: F) -> Result<()>
    where
        F: FnOnce(&mut ConversationRecord) + Send,
    {
        let path = self.document_path(channel)?;
        let _guard = self.write_lock.lock().await;

        let mut record = match Self::read(&path).await {
            Err(StoreError::Io { source, .. }) if source.kind() == ErrorKind::NotFound => {
                return Err(StoreError::NotFound(channel.clone()));
            }
            other => other?,
        };

        apply(&mut record);
        Self::write(&path, &record).await
    }
}

#[async_trait]
impl ConversationStore for FileStore {
    async fn load_all(&self) -> Result<Vec<ConversationRecord>> {
        let io_err = |source| StoreError::Io {
            path: self.dir.clone(),
            source,
        };

        let mut entries = tokio::fs::read_dir(&self.dir).await.map_err(io_err)?;
        let mut records = Vec::new();

        while let Some(entry) = entries.next_entry().await.map_err(io_err)? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }

            records.push(Self::read(&path).await?);
        }

        records.sort_by(|a, b| a.channel.cmp(&b.channel));
        Ok(records)
    }

    async fn create_conversation(&self, record: &ConversationRecord) -> Result<()> {
        let path = self.document_path(&record.channel)?;
        let _guard = self.write_lock.lock().await;

        if tokio::fs::try_exists(&path).await.map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })? {
            return Err(StoreError::AlreadyExists(record.channel.clone()));
        }

        Self::write(&path, record).await
    }

    async fn insert_message(&self, channel: &ChannelId, message: &Message) -> Result<()> {
        let message = message.clone();
        self.update(channel, move |record| record.messages.push(message)).await
    }

    async fn update_usage(&self, channel: &ChannelId, usage: Option<Usage>) -> Result<()> {
        self.update(channel, move |record| record.usage = usage).await
    }

    async fn delete_conversation(&self, channel: &ChannelId) -> Result<()> {
        let path = self.document_path(channel)?;
        let _guard = self.write_lock.lock().await;

        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StoreError::NotFound(channel.clone())),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }
}
