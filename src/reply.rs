//! Reply protocol
//!
//! Actions describe their answer as a [`ReplyDirective`]. [`deliver`] turns
//! the payload into exactly one [`OutboundMessage`] and hands it to the chat
//! client, scheduling cleanup of stale messages when the guild asks for it.

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::client::ChatClient;
use crate::error::{MovieNightError, Result};
use crate::types::{Embed, MessageRef, ServerPolicy, Snowflake};

/// Where a reply goes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum ReplyTarget {
    /// A guild or DM channel
    Channel(Snowflake),
    /// A user, reached through their DM channel
    User(Snowflake),
}

/// Keyword-style send options
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SendOptions {
    /// Text content
    pub content: Option<String>,
    /// Rich embed
    pub embed: Option<Embed>,
    /// Text-to-speech
    pub tts: bool,
}

/// What an action wants sent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ReplyPayload {
    /// Plain text, sent as-is
    Text(String),
    /// Positional content values, sent in order as consecutive lines
    Positional(Vec<String>),
    /// Named send options
    Options(SendOptions),
}

/// The single message shape handed to the chat client
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutboundMessage {
    /// Text content
    pub content: Option<String>,
    /// Rich embed
    pub embed: Option<Embed>,
    /// Text-to-speech
    pub tts: bool,
}

impl OutboundMessage {
    /// Whether there is nothing Discord would accept: no embed and no
    /// visible text
    pub fn is_empty(&self) -> bool {
        self.embed.is_none() && self.content.as_deref().map_or(true, |c| c.trim().is_empty())
    }
}

impl From<&ReplyPayload> for OutboundMessage {
    fn from(payload: &ReplyPayload) -> Self {
        match payload {
            ReplyPayload::Text(text) => OutboundMessage {
                content: Some(text.clone()),
                ..OutboundMessage::default()
            },
            ReplyPayload::Positional(parts) => OutboundMessage {
                content: (!parts.is_empty()).then(|| parts.join("\n")),
                ..OutboundMessage::default()
            },
            ReplyPayload::Options(opts) => OutboundMessage {
                content: opts.content.clone(),
                embed: opts.embed.clone(),
                tts: opts.tts,
            },
        }
    }
}

/// An action's complete answer
#[derive(Debug, Clone, PartialEq)]
pub struct ReplyDirective {
    /// Destination
    pub target: ReplyTarget,
    /// Content
    pub payload: ReplyPayload,
    /// Messages to remove once the guild's timeout elapses
    pub also_delete: Vec<MessageRef>,
}

impl ReplyDirective {
    /// Reply into a channel
    pub fn to_channel(channel: Snowflake, payload: ReplyPayload) -> Self {
        Self {
            target: ReplyTarget::Channel(channel),
            payload,
            also_delete: Vec::new(),
        }
    }

    /// Reply into a user's DMs
    pub fn to_user(user: Snowflake, payload: ReplyPayload) -> Self {
        Self {
            target: ReplyTarget::User(user),
            payload,
            also_delete: Vec::new(),
        }
    }

    /// Plain text reply into a channel
    pub fn text(channel: Snowflake, text: impl Into<String>) -> Self {
        Self::to_channel(channel, ReplyPayload::Text(text.into()))
    }

    /// Queue messages for cleanup (builder pattern)
    pub fn also_delete(mut self, messages: impl IntoIterator<Item = MessageRef>) -> Self {
        self.also_delete.extend(messages);
        self
    }
}

/// Send a directive through the chat client.
///
/// A payload with nothing to show fails with `EmptyReply` before anything is
/// sent or scheduled. Otherwise cleanup of `also_delete` is scheduled before
/// sending, so it happens even when the send itself is refused.
pub async fn deliver(
    client: &Arc<dyn ChatClient>,
    directive: &ReplyDirective,
    policy: Option<&ServerPolicy>,
) -> Result<MessageRef> {
    let message = OutboundMessage::from(&directive.payload);
    if message.is_empty() {
        return Err(MovieNightError::EmptyReply);
    }

    if let Some(policy) = policy {
        if policy.auto_delete_enabled() && !directive.also_delete.is_empty() {
            schedule_cleanup(
                client.clone(),
                directive.also_delete.clone(),
                Duration::from_secs(policy.message_timeout),
            );
        }
    }

    client.send(directive.target, &message).await
}

/// Best-effort plain text notice. A failed send is logged, never returned.
pub async fn notify(client: &dyn ChatClient, target: ReplyTarget, text: &str) {
    let message = OutboundMessage {
        content: Some(text.to_string()),
        ..OutboundMessage::default()
    };
    if let Err(e) = client.send(target, &message).await {
        warn!("Failed to send notice to {:?}: {}", target, e);
    }
}

/// Delete messages after a delay on a detached task.
///
/// Failures are logged and dropped; nothing is reported back to the caller.
pub fn schedule_cleanup(
    client: Arc<dyn ChatClient>,
    messages: Vec<MessageRef>,
    delay: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        let results = join_all(messages.iter().map(|m| client.delete_message(*m))).await;
        for (message, result) in messages.iter().zip(results) {
            match result {
                Ok(()) => debug!("Cleaned up message {}", message.message_id),
                Err(e) => warn!("Failed to clean up message {}: {}", message.message_id, e),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingClient;
    use pretty_assertions::assert_eq;

    fn id(n: u64) -> Snowflake {
        Snowflake::new(n).unwrap()
    }

    #[test]
    fn test_payload_normalization() {
        let text = OutboundMessage::from(&ReplyPayload::Text("hello".to_string()));
        assert_eq!(text.content.as_deref(), Some("hello"));

        let positional = OutboundMessage::from(&ReplyPayload::Positional(vec![
            "first".to_string(),
            "second".to_string(),
        ]));
        assert_eq!(positional.content.as_deref(), Some("first\nsecond"));

        let empty = OutboundMessage::from(&ReplyPayload::Positional(Vec::new()));
        assert_eq!(empty.content, None);

        let options = OutboundMessage::from(&ReplyPayload::Options(SendOptions {
            content: None,
            embed: Some(Embed::titled("Help")),
            tts: true,
        }));
        assert_eq!(options.embed, Some(Embed::titled("Help")));
        assert!(options.tts);
    }

    #[tokio::test]
    async fn test_deliver_text_sends_once() {
        let recorder = Arc::new(RecordingClient::default());
        let client: Arc<dyn ChatClient> = recorder.clone();

        deliver(&client, &ReplyDirective::text(id(10), "hello"), None)
            .await
            .unwrap();

        assert_eq!(
            recorder.sent(),
            vec![(ReplyTarget::Channel(id(10)), Some("hello".to_string()))]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_cleanup_scheduled_only_with_timeout() {
        let recorder = Arc::new(RecordingClient::default());
        let client: Arc<dyn ChatClient> = recorder.clone();
        let stale = MessageRef {
            channel_id: id(10),
            message_id: id(99),
        };
        let directive = ReplyDirective::text(id(10), "done").also_delete([stale]);

        let mut policy = ServerPolicy::new(id(1), id(10), "admin");
        deliver(&client, &directive, Some(&policy)).await.unwrap();
        tokio::time::sleep(Duration::from_secs(3600)).await;
        assert!(recorder.deleted().is_empty());

        policy.message_timeout = 30;
        deliver(&client, &directive, Some(&policy)).await.unwrap();
        tokio::time::sleep(Duration::from_secs(29)).await;
        assert!(recorder.deleted().is_empty());
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(recorder.deleted(), vec![stale]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cleanup_failures_are_swallowed() {
        let recorder = Arc::new(RecordingClient::default());
        recorder.fail_deletes();
        let client: Arc<dyn ChatClient> = recorder.clone();
        let stale = MessageRef {
            channel_id: id(10),
            message_id: id(99),
        };

        let handle = schedule_cleanup(client, vec![stale], Duration::from_secs(5));
        tokio::time::sleep(Duration::from_secs(6)).await;
        assert!(handle.await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_payload_is_never_sent() {
        let recorder = Arc::new(RecordingClient::default());
        let client: Arc<dyn ChatClient> = recorder.clone();
        let mut policy = ServerPolicy::new(id(1), id(10), "admin");
        policy.message_timeout = 5;
        let stale = MessageRef {
            channel_id: id(10),
            message_id: id(99),
        };

        for payload in [
            ReplyPayload::Text(String::new()),
            ReplyPayload::Text("  \n ".to_string()),
            ReplyPayload::Positional(Vec::new()),
            ReplyPayload::Options(SendOptions::default()),
        ] {
            let directive = ReplyDirective::to_channel(id(10), payload).also_delete([stale]);
            let err = deliver(&client, &directive, Some(&policy)).await.unwrap_err();
            assert!(matches!(err, MovieNightError::EmptyReply));
        }

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(recorder.attempts().is_empty());
        assert!(recorder.deleted().is_empty());
    }
}
