//! Test doubles shared by unit tests

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::actions::{builtin_actions, Action};
use crate::client::ChatClient;
use crate::error::{MovieNightError, Result, CANNOT_MESSAGE_USER};
use crate::reply::{OutboundMessage, ReplyTarget};
use crate::store::{InMemorySettingsStore, InMemoryVoteStore, SettingsStore};
use crate::types::{Author, IncomingMessage, MessageRef, ServerPolicy, Snowflake};

pub const GUILD: u64 = 1;
pub const BOT_CHANNEL: u64 = 10;
pub const OTHER_CHANNEL: u64 = 11;
pub const AUTHOR: u64 = 100;
pub const ADMIN_ROLE: &str = "movie-admin";

pub fn id(n: u64) -> Snowflake {
    Snowflake::new(n).unwrap()
}

/// Chat client that records every successful send and delete
#[derive(Default)]
pub struct RecordingClient {
    sent: Mutex<Vec<(ReplyTarget, OutboundMessage)>>,
    attempts: Mutex<Vec<ReplyTarget>>,
    deleted: Mutex<Vec<MessageRef>>,
    edited: Mutex<Vec<(MessageRef, OutboundMessage)>>,
    cleared: Mutex<Vec<MessageRef>>,
    refuse_dms: AtomicBool,
    fail_deletes: AtomicBool,
    next_id: AtomicU64,
}

impl RecordingClient {
    pub fn refuse_dms(&self) {
        self.refuse_dms.store(true, Ordering::SeqCst);
    }

    pub fn fail_deletes(&self) {
        self.fail_deletes.store(true, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<(ReplyTarget, Option<String>)> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|(t, m)| (*t, m.content.clone()))
            .collect()
    }

    pub fn sent_messages(&self) -> Vec<(ReplyTarget, OutboundMessage)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn attempts(&self) -> Vec<ReplyTarget> {
        self.attempts.lock().unwrap().clone()
    }

    pub fn deleted(&self) -> Vec<MessageRef> {
        self.deleted.lock().unwrap().clone()
    }

    pub fn edited(&self) -> Vec<(MessageRef, OutboundMessage)> {
        self.edited.lock().unwrap().clone()
    }

    pub fn cleared(&self) -> Vec<MessageRef> {
        self.cleared.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatClient for RecordingClient {
    async fn send(&self, target: ReplyTarget, message: &OutboundMessage) -> Result<MessageRef> {
        self.attempts.lock().unwrap().push(target);
        if matches!(target, ReplyTarget::User(_)) && self.refuse_dms.load(Ordering::SeqCst) {
            return Err(MovieNightError::Platform {
                code: CANNOT_MESSAGE_USER,
                message: "Cannot send messages to this user".to_string(),
            });
        }
        self.sent.lock().unwrap().push((target, message.clone()));

        let channel = match target {
            ReplyTarget::Channel(c) => c,
            ReplyTarget::User(u) => u,
        };
        Ok(MessageRef {
            channel_id: channel,
            message_id: id(1000 + self.next_id.fetch_add(1, Ordering::SeqCst)),
        })
    }

    async fn delete_message(&self, message: MessageRef) -> Result<()> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(MovieNightError::Platform {
                code: 10008,
                message: "Unknown Message".to_string(),
            });
        }
        self.deleted.lock().unwrap().push(message);
        Ok(())
    }

    async fn edit_message(&self, message: MessageRef, update: &OutboundMessage) -> Result<()> {
        self.edited.lock().unwrap().push((message, update.clone()));
        Ok(())
    }

    async fn clear_reactions(&self, message: MessageRef) -> Result<()> {
        self.cleared.lock().unwrap().push(message);
        Ok(())
    }
}

pub fn author(is_administrator: bool, roles: &[&str]) -> Author {
    Author {
        id: id(AUTHOR),
        name: "sam".to_string(),
        is_administrator,
        role_names: roles.iter().map(|r| r.to_string()).collect(),
    }
}

/// A message from a regular member in the bot channel
pub fn guild_message(content: &str) -> IncomingMessage {
    IncomingMessage {
        id: id(500),
        channel_id: id(BOT_CHANNEL),
        guild_id: Some(id(GUILD)),
        guild_name: Some("Film Club".to_string()),
        author: author(false, &[]),
        content: content.to_string(),
    }
}

/// A message sent to the bot over DM
pub fn direct_message(content: &str) -> IncomingMessage {
    IncomingMessage {
        id: id(501),
        channel_id: id(20),
        guild_id: None,
        guild_name: None,
        author: author(false, &[]),
        content: content.to_string(),
    }
}

pub async fn seeded_store() -> Arc<InMemorySettingsStore> {
    let store = Arc::new(InMemorySettingsStore::new());
    store
        .put_server_policy(ServerPolicy::new(id(GUILD), id(BOT_CHANNEL), ADMIN_ROLE))
        .await
        .unwrap();
    store
}

/// The built-in actions over `store`, with no open votes
pub fn builtins(store: Arc<dyn SettingsStore>) -> Vec<Arc<dyn Action>> {
    builtin_actions(
        store,
        Arc::new(InMemoryVoteStore::new()),
        Arc::new(RecordingClient::default()),
        "m!",
    )
}
