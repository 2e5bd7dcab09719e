//! Chat platform client seam
//!
//! The dispatch core talks to Discord only through [`ChatClient`]. The
//! serenity-backed [`SerenityClient`] is the production implementation.

use async_trait::async_trait;

use crate::error::Result;
use crate::reply::{OutboundMessage, ReplyTarget};
use crate::types::MessageRef;

/// Maximum message length for Discord
pub const MAX_MESSAGE_LENGTH: usize = 2000;

/// Outbound operations the dispatch core needs from the chat platform
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Send a message to a channel or a user's DMs.
    ///
    /// A refused DM surfaces as an error whose
    /// [`is_cannot_dm`](crate::MovieNightError::is_cannot_dm) is true.
    async fn send(&self, target: ReplyTarget, message: &OutboundMessage) -> Result<MessageRef>;

    /// Delete a previously sent or received message
    async fn delete_message(&self, message: MessageRef) -> Result<()>;

    /// Replace a sent message's content. An `embed` of `None` removes the
    /// message's embeds.
    async fn edit_message(&self, message: MessageRef, update: &OutboundMessage) -> Result<()>;

    /// Remove every reaction from a message
    async fn clear_reactions(&self, message: MessageRef) -> Result<()>;
}

/// Split text into chunks that fit within Discord's limit.
///
/// Breaks on line boundaries where possible and hard-splits lines that are
/// longer than the limit on their own.
pub fn split_message(content: &str) -> Vec<String> {
    if content.chars().count() <= MAX_MESSAGE_LENGTH {
        return vec![content.to_string()];
    }

    let mut parts = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for line in content.lines() {
        let line_len = line.chars().count();
        let sep = usize::from(current_len > 0);

        if current_len + sep + line_len <= MAX_MESSAGE_LENGTH {
            if sep == 1 {
                current.push('\n');
            }
            current.push_str(line);
            current_len += sep + line_len;
            continue;
        }

        if current_len > 0 {
            parts.push(std::mem::take(&mut current));
            current_len = 0;
        }

        let chars: Vec<char> = line.chars().collect();
        let mut chunks = chars.chunks(MAX_MESSAGE_LENGTH).peekable();
        while let Some(chunk) = chunks.next() {
            if chunks.peek().is_some() {
                parts.push(chunk.iter().collect());
            } else {
                current = chunk.iter().collect();
                current_len = chunk.len();
            }
        }
    }

    if current_len > 0 {
        parts.push(current);
    }

    parts
}

#[cfg(feature = "native")]
pub use self::serenity_client::SerenityClient;

#[cfg(feature = "native")]
mod serenity_client {
    use async_trait::async_trait;
    use serenity::all::{ChannelId, MessageId, UserId};
    use serenity::builder::{CreateEmbed, CreateEmbedFooter, CreateMessage, EditMessage};
    use serenity::http::Http;
    use std::sync::Arc;
    use tracing::debug;

    use super::{split_message, ChatClient};
    use crate::error::{MovieNightError, Result};
    use crate::reply::{OutboundMessage, ReplyTarget};
    use crate::types::{Embed, MessageRef, Snowflake};

    /// [`ChatClient`] backed by serenity's REST client
    #[derive(Clone)]
    pub struct SerenityClient {
        http: Arc<Http>,
    }

    impl SerenityClient {
        /// Wrap an HTTP client obtained from a running serenity `Client`
        pub fn new(http: Arc<Http>) -> Self {
            Self { http }
        }

        async fn resolve_channel(&self, target: ReplyTarget) -> Result<ChannelId> {
            match target {
                ReplyTarget::Channel(id) => Ok(ChannelId::new(id.get())),
                ReplyTarget::User(id) => {
                    let dm = UserId::new(id.get()).create_dm_channel(&self.http).await?;
                    Ok(dm.id)
                }
            }
        }
    }

    fn build_embed(embed: &Embed) -> CreateEmbed {
        let mut builder = CreateEmbed::new();
        if let Some(title) = &embed.title {
            builder = builder.title(title);
        }
        if let Some(description) = &embed.description {
            builder = builder.description(description);
        }
        if let Some(color) = embed.color {
            builder = builder.colour(color);
        }
        if let Some(footer) = &embed.footer {
            builder = builder.footer(CreateEmbedFooter::new(footer));
        }
        for field in &embed.fields {
            builder = builder.field(&field.name, &field.value, field.inline);
        }
        builder
    }

    #[async_trait]
    impl ChatClient for SerenityClient {
        async fn send(&self, target: ReplyTarget, message: &OutboundMessage) -> Result<MessageRef> {
            let channel = self.resolve_channel(target).await?;

            let mut parts = message
                .content
                .as_deref()
                .map(split_message)
                .unwrap_or_default();
            if parts.is_empty() {
                if message.embed.is_none() {
                    return Err(MovieNightError::InvalidArgument(
                        "No message content provided".to_string(),
                    ));
                }
                parts.push(String::new());
            }

            let last = parts.len() - 1;
            let mut sent = None;
            for (i, part) in parts.into_iter().enumerate() {
                let mut builder = CreateMessage::new().tts(message.tts);
                if !part.is_empty() {
                    builder = builder.content(part);
                }
                if i == last {
                    if let Some(embed) = &message.embed {
                        builder = builder.embed(build_embed(embed));
                    }
                }
                sent = Some(channel.send_message(&self.http, builder).await?);
            }

            let sent = sent.ok_or_else(|| {
                MovieNightError::Internal("Discord returned no message".to_string())
            })?;
            debug!("Sent message {} to channel {}", sent.id, channel);

            Ok(MessageRef {
                channel_id: Snowflake::new(channel.get())?,
                message_id: Snowflake::new(sent.id.get())?,
            })
        }

        async fn delete_message(&self, message: MessageRef) -> Result<()> {
            ChannelId::new(message.channel_id.get())
                .delete_message(&self.http, MessageId::new(message.message_id.get()))
                .await?;
            Ok(())
        }

        async fn edit_message(&self, message: MessageRef, update: &OutboundMessage) -> Result<()> {
            let embeds = update.embed.iter().map(build_embed).collect();
            let mut builder = EditMessage::new().embeds(embeds);
            if let Some(content) = &update.content {
                builder = builder.content(content);
            }

            ChannelId::new(message.channel_id.get())
                .edit_message(&self.http, MessageId::new(message.message_id.get()), builder)
                .await?;
            Ok(())
        }

        async fn clear_reactions(&self, message: MessageRef) -> Result<()> {
            ChannelId::new(message.channel_id.get())
                .delete_reactions(&self.http, MessageId::new(message.message_id.get()))
                .await?;
            Ok(())
        }
    }
}
