//! In-memory platform double shared by the unit tests

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::error::{PlatformError, Result};
use crate::platform::{ChannelId, MessageId, Platform};

/// A recorded platform call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Create { id: String, content: String },
    Edit { id: String, content: String },
    Typing,
}

/// Platform that records every call and can be told to fail
#[derive(Debug, Default)]
pub struct RecordingPlatform {
    calls: Mutex<Vec<Call>>,
    next_id: AtomicUsize,
    fail_create: AtomicBool,
    fail_edit: AtomicBool,
    fail_typing: AtomicBool,
}

impl RecordingPlatform {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn typing_count(&self) -> usize {
        self.calls().iter().filter(|c| **c == Call::Typing).count()
    }

    pub fn fail_creates(&self) {
        self.fail_create.store(true, Ordering::SeqCst);
    }

    pub fn fail_edits(&self) {
        self.fail_edit.store(true, Ordering::SeqCst);
    }

    pub fn fail_typing(&self) {
        self.fail_typing.store(true, Ordering::SeqCst);
    }

    fn rejected() -> PlatformError {
        PlatformError::Api {
            status: 403,
            code: Some(50013),
            message: "Missing Permissions".to_owned(),
        }
    }
}

#[async_trait]
impl Platform for RecordingPlatform {
    async fn create_message(&self, _channel: &ChannelId, content: &str) -> Result<MessageId> {
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(Self::rejected());
        }

        let id = format!("m{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        self.calls.lock().unwrap().push(Call::Create {
            id: id.clone(),
            content: content.to_owned(),
        });
        Ok(MessageId::new(id))
    }

    async fn edit_message(&self, _channel: &ChannelId, message: &MessageId, content: &str) -> Result<()> {
        if self.fail_edit.load(Ordering::SeqCst) {
            return Err(Self::rejected());
        }

        self.calls.lock().unwrap().push(Call::Edit {
            id: message.as_str().to_owned(),
            content: content.to_owned(),
        });
        Ok(())
    }

    async fn set_typing(&self, _channel: &ChannelId) -> Result<()> {
        if self.fail_typing.load(Ordering::SeqCst) {
            return Err(Self::rejected());
        }

        self.calls.lock().unwrap().push(Call::Typing);
        Ok(())
    }
}
