//! Bot configuration
//!
//! Configuration can be loaded from environment variables or constructed programmatically.

use serde::{Deserialize, Serialize};

use crate::error::{MovieNightError, Result};

/// Prefix every command must start with
pub const DEFAULT_COMMAND_PREFIX: &str = "m!";

/// Admin role assigned to guilds the bot joins
pub const DEFAULT_ADMIN_ROLE: &str = "movienight-admin";

/// Movie night bot configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    /// Bot token for Discord API authentication (required)
    pub token: String,

    /// Prefix that marks a message as a command
    pub command_prefix: String,

    /// Admin role name written into new server settings
    pub default_admin_role: String,

    /// Whether to ignore messages from other bots
    pub should_ignore_bot_messages: bool,
}

impl BotConfig {
    /// Create a new configuration with defaults for everything but the token
    ///
    /// # Example
    ///
    /// ```
    /// use elizaos_plugin_movienight::BotConfig;
    ///
    /// let config = BotConfig::new("your-bot-token".to_string());
    /// assert_eq!(config.command_prefix, "m!");
    /// ```
    pub fn new(token: String) -> Self {
        Self {
            token,
            command_prefix: DEFAULT_COMMAND_PREFIX.to_string(),
            default_admin_role: DEFAULT_ADMIN_ROLE.to_string(),
            should_ignore_bot_messages: true,
        }
    }

    /// Load configuration from environment variables
    ///
    /// # Required Variables
    ///
    /// - `DISCORD_API_TOKEN`: Bot token
    ///
    /// # Optional Variables
    ///
    /// - `MOVIENIGHT_COMMAND_PREFIX`: Command prefix (default `m!`)
    /// - `MOVIENIGHT_DEFAULT_ADMIN_ROLE`: Admin role for new guilds
    /// - `DISCORD_SHOULD_IGNORE_BOT_MESSAGES`: "true" or "false"
    ///
    /// # Errors
    ///
    /// Returns `MovieNightError::MissingSetting` if the token is missing.
    pub fn from_env() -> Result<Self> {
        let token = std::env::var("DISCORD_API_TOKEN")
            .map_err(|_| MovieNightError::MissingSetting("DISCORD_API_TOKEN".to_string()))?;

        if token.is_empty() {
            return Err(MovieNightError::ConfigError(
                "DISCORD_API_TOKEN cannot be empty".to_string(),
            ));
        }

        let mut config = Self::new(token);

        if let Ok(prefix) = std::env::var("MOVIENIGHT_COMMAND_PREFIX") {
            config.command_prefix = prefix.trim().to_string();
        }

        if let Ok(role) = std::env::var("MOVIENIGHT_DEFAULT_ADMIN_ROLE") {
            config.default_admin_role = role.trim().to_string();
        }

        config.should_ignore_bot_messages = std::env::var("DISCORD_SHOULD_IGNORE_BOT_MESSAGES")
            .ok()
            .map(|s| s.to_lowercase() == "true")
            .unwrap_or(true);

        config.validate()?;
        Ok(config)
    }

    /// Set the command prefix (builder pattern)
    pub fn with_command_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.command_prefix = prefix.into();
        self
    }

    /// Set the admin role for new guilds (builder pattern)
    pub fn with_default_admin_role(mut self, role: impl Into<String>) -> Self {
        self.default_admin_role = role.into();
        self
    }

    /// Set whether to ignore bot messages (builder pattern)
    pub fn with_ignore_bot_messages(mut self, ignore: bool) -> Self {
        self.should_ignore_bot_messages = ignore;
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.token.is_empty() {
            return Err(MovieNightError::ConfigError(
                "Token cannot be empty".to_string(),
            ));
        }

        if self.command_prefix.is_empty() || self.command_prefix.chars().any(char::is_whitespace) {
            return Err(MovieNightError::ConfigError(format!(
                "Command prefix must be non-empty and contain no whitespace, got {:?}",
                self.command_prefix
            )));
        }

        if self.default_admin_role.is_empty() {
            return Err(MovieNightError::ConfigError(
                "Default admin role cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}
