//! Shared fixtures for integration tests

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use elizaos_plugin_movienight::error::CANNOT_MESSAGE_USER;
use elizaos_plugin_movienight::reply::OutboundMessage;
use elizaos_plugin_movienight::{
    Author, ChatClient, IncomingMessage, InMemorySettingsStore, MessageRef, MovieNightError,
    ReplyTarget, Result, ServerPolicy, SettingsStore, Snowflake,
};

pub const GUILD: u64 = 700_000_000_000_000_001;
pub const BOT_CHANNEL: u64 = 700_000_000_000_000_010;
pub const AUTHOR: u64 = 700_000_000_000_000_100;

pub fn sf(n: u64) -> Snowflake {
    Snowflake::new(n).expect("test ids are non-zero")
}

/// Records what the bot sent; optionally refuses every DM
#[derive(Default)]
pub struct FakeDiscord {
    pub sent: Mutex<Vec<(ReplyTarget, OutboundMessage)>>,
    pub edited: Mutex<Vec<(MessageRef, OutboundMessage)>>,
    pub dms_closed: bool,
}

impl FakeDiscord {
    pub fn with_dms_closed() -> Self {
        Self {
            dms_closed: true,
            ..Self::default()
        }
    }

    pub fn texts(&self) -> Vec<(ReplyTarget, String)> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|(t, m)| (*t, m.content.clone().unwrap_or_default()))
            .collect()
    }
}

#[async_trait]
impl ChatClient for FakeDiscord {
    async fn send(&self, target: ReplyTarget, message: &OutboundMessage) -> Result<MessageRef> {
        if self.dms_closed && matches!(target, ReplyTarget::User(_)) {
            return Err(MovieNightError::Platform {
                code: CANNOT_MESSAGE_USER,
                message: "Cannot send messages to this user".to_string(),
            });
        }
        let mut sent = self.sent.lock().unwrap();
        sent.push((target, message.clone()));
        Ok(MessageRef {
            channel_id: sf(BOT_CHANNEL),
            message_id: sf(900 + sent.len() as u64),
        })
    }

    async fn delete_message(&self, _message: MessageRef) -> Result<()> {
        Ok(())
    }

    async fn edit_message(&self, message: MessageRef, update: &OutboundMessage) -> Result<()> {
        self.edited.lock().unwrap().push((message, update.clone()));
        Ok(())
    }

    async fn clear_reactions(&self, _message: MessageRef) -> Result<()> {
        Ok(())
    }
}

pub fn message(content: &str, admin: bool) -> IncomingMessage {
    IncomingMessage {
        id: sf(800),
        channel_id: sf(BOT_CHANNEL),
        guild_id: Some(sf(GUILD)),
        guild_name: Some("Film Club".to_string()),
        author: Author {
            id: sf(AUTHOR),
            name: "riley".to_string(),
            is_administrator: admin,
            role_names: vec!["member".to_string()],
        },
        content: content.to_string(),
    }
}

pub async fn store() -> Arc<InMemorySettingsStore> {
    let store = Arc::new(InMemorySettingsStore::new());
    store
        .put_server_policy(ServerPolicy::new(sf(GUILD), sf(BOT_CHANNEL), "movie-admin"))
        .await
        .expect("in-memory store accepts writes");
    store
}
