//! Type definitions for the movie night bot
//!
//! Platform-neutral views of the Discord objects the dispatch core reads.
//! The service binding builds these from serenity models; tests build them
//! directly.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{MovieNightError, Result};

/// Discord snowflake ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Snowflake(u64);

impl Snowflake {
    /// Wrap a raw id. Zero is never issued by Discord and is rejected.
    pub fn new(id: u64) -> Result<Self> {
        if id == 0 {
            return Err(MovieNightError::InvalidSnowflake(
                "Snowflake cannot be zero".to_string(),
            ));
        }
        Ok(Self(id))
    }

    /// Get the raw integer value
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Snowflake {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Snowflake {
    type Err = MovieNightError;

    fn from_str(s: &str) -> Result<Self> {
        if s.is_empty() || !s.chars().all(|c| c.is_ascii_digit()) {
            return Err(MovieNightError::InvalidSnowflake(format!(
                "Snowflake must contain only digits, got {:?}",
                s
            )));
        }
        let id = s
            .parse::<u64>()
            .map_err(|e| MovieNightError::InvalidSnowflake(e.to_string()))?;
        Self::new(id)
    }
}

impl TryFrom<String> for Snowflake {
    type Error = MovieNightError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Snowflake> for String {
    fn from(snowflake: Snowflake) -> String {
        snowflake.0.to_string()
    }
}

/// The member who sent a message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    /// User ID
    pub id: Snowflake,
    /// Username shown in replies
    pub name: String,
    /// Whether the member holds the guild's native administrator permission
    pub is_administrator: bool,
    /// Names of the member's guild roles (empty in DMs)
    pub role_names: Vec<String>,
}

impl Author {
    /// Whether the member carries a role with the given name
    pub fn has_role(&self, role: &str) -> bool {
        self.role_names.iter().any(|r| r == role)
    }
}

/// A message received from Discord
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomingMessage {
    /// Message ID
    pub id: Snowflake,
    /// Channel the message was posted in
    pub channel_id: Snowflake,
    /// Guild ID (None for DMs)
    pub guild_id: Option<Snowflake>,
    /// Guild name, when known
    pub guild_name: Option<String>,
    /// Who sent it
    pub author: Author,
    /// Raw message text
    pub content: String,
}

impl IncomingMessage {
    /// Whether the message arrived through a direct message channel
    pub fn is_direct_message(&self) -> bool {
        self.guild_id.is_none()
    }

    /// Reference to this message, for later cleanup
    pub fn message_ref(&self) -> MessageRef {
        MessageRef {
            channel_id: self.channel_id,
            message_id: self.id,
        }
    }
}

/// Locates a previously sent or received message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageRef {
    /// Channel holding the message
    pub channel_id: Snowflake,
    /// Message ID
    pub message_id: Snowflake,
}

/// Per-guild settings read by the permission gate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerPolicy {
    /// Guild the settings belong to
    pub guild_id: Snowflake,
    /// The only channel the bot answers commands in
    pub channel: Snowflake,
    /// Role name that grants admin commands
    pub admin_role: String,
    /// Seconds before bot chatter is cleaned up (0 = never)
    pub message_timeout: u64,
    /// Votes each member may cast
    pub num_votes_per_user: u32,
    /// Suggestions drawn into each vote
    pub num_movies_per_vote: u32,
}

impl ServerPolicy {
    /// Default settings for a guild the bot just joined
    pub fn new(guild_id: Snowflake, channel: Snowflake, admin_role: impl Into<String>) -> Self {
        Self {
            guild_id,
            channel,
            admin_role: admin_role.into(),
            message_timeout: 0,
            num_votes_per_user: 4,
            num_movies_per_vote: 8,
        }
    }

    /// Whether cleanup of bot chatter is enabled
    pub fn auto_delete_enabled(&self) -> bool {
        self.message_timeout > 0
    }
}

/// A movie vote that is open in a guild
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRecord {
    /// Guild running the vote
    pub guild_id: Snowflake,
    /// The message members react to when voting
    pub message: MessageRef,
}

/// Discord embed
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Embed {
    /// Title
    pub title: Option<String>,
    /// Description
    pub description: Option<String>,
    /// Color (as integer)
    pub color: Option<u32>,
    /// Footer text
    pub footer: Option<String>,
    /// Fields
    pub fields: Vec<EmbedField>,
}

impl Embed {
    /// Start an embed with a title
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    /// Set the description (builder pattern)
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the color (builder pattern)
    pub fn color(mut self, color: u32) -> Self {
        self.color = Some(color);
        self
    }

    /// Set the footer (builder pattern)
    pub fn footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(footer.into());
        self
    }

    /// Append a field (builder pattern)
    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        self.fields.push(EmbedField {
            name: name.into(),
            value: value.into(),
            inline,
        });
        self
    }
}

/// Discord embed field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbedField {
    /// Field name
    pub name: String,
    /// Field value
    pub value: String,
    /// Whether field should be inline
    pub inline: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snowflake_parse() {
        let s: Snowflake = "123456789012345678".parse().unwrap();
        assert_eq!(s.get(), 123456789012345678u64);
        assert_eq!(s.to_string(), "123456789012345678");
    }

    #[test]
    fn test_snowflake_invalid() {
        assert!("".parse::<Snowflake>().is_err());
        assert!("0".parse::<Snowflake>().is_err());
        assert!("12a4".parse::<Snowflake>().is_err());
        assert!("-12".parse::<Snowflake>().is_err());
        assert!("99999999999999999999999".parse::<Snowflake>().is_err());
    }

    #[test]
    fn test_snowflake_serde_as_string() {
        let s = Snowflake::new(42).unwrap();
        assert_eq!(serde_json::to_string(&s).unwrap(), "\"42\"");
        let back: Snowflake = serde_json::from_str("\"42\"").unwrap();
        assert_eq!(back, s);
    }

    #[test]
    fn test_author_roles() {
        let author = Author {
            id: Snowflake::new(7).unwrap(),
            name: "sam".to_string(),
            is_administrator: false,
            role_names: vec!["movie-admin".to_string()],
        };
        assert!(author.has_role("movie-admin"));
        assert!(!author.has_role("movie"));
    }

    #[test]
    fn test_embed_builder() {
        let embed = Embed::titled("Settings")
            .description("Current values")
            .field("Timeout", "0", true);
        assert_eq!(embed.title.as_deref(), Some("Settings"));
        assert_eq!(embed.fields.len(), 1);
        assert!(embed.fields[0].inline);
    }
}
