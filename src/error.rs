//! Error types for the movie night bot
//!
//! One error enum covers every failure the dispatch core can observe. The
//! dispatch envelope classifies these into user-facing outcomes, so variants
//! carry enough detail for server-side logs but are never shown to users.

use thiserror::Error;

use crate::types::Snowflake;

/// Result type alias for movie night operations
pub type Result<T> = std::result::Result<T, MovieNightError>;

/// Discord JSON error code for "Cannot send messages to this user".
pub const CANNOT_MESSAGE_USER: i64 = 50007;

/// Movie night bot error types
#[derive(Debug, Error)]
pub enum MovieNightError {
    /// Chat client is not initialized
    #[error("Chat client not initialized - call start() first")]
    ClientNotInitialized,

    /// Bot service is already running
    #[error("Movie night service is already running")]
    AlreadyRunning,

    /// Failed to connect to Discord
    #[error("Failed to connect to Discord: {0}")]
    ConnectionFailed(String),

    /// Serenity library error
    #[cfg(feature = "native")]
    #[error("Discord API error: {0}")]
    SerenityError(#[from] serenity::Error),

    /// Discord refused the request with a JSON error code
    #[error("Discord refused the request (code {code}): {message}")]
    Platform {
        /// Discord JSON error code
        code: i64,
        /// Message returned alongside the code
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Missing required setting
    #[error("Missing required setting: {0}")]
    MissingSetting(String),

    /// Invalid snowflake ID
    #[error("Invalid Discord snowflake: {0}")]
    InvalidSnowflake(String),

    /// Invalid argument supplied to a command
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// No settings record exists for the guild
    #[error("No server settings stored for guild {0}")]
    PolicyNotFound(Snowflake),

    /// A vote is already open in the guild
    #[error("A vote is already running in guild {0}")]
    VoteAlreadyRunning(Snowflake),

    /// An action produced a reply with nothing to send
    #[error("Reply has no content and no embed")]
    EmptyReply,

    /// A command rejected its input
    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl MovieNightError {
    /// Whether Discord refused to open a DM with the recipient
    pub fn is_cannot_dm(&self) -> bool {
        self.platform_code() == Some(CANNOT_MESSAGE_USER)
    }

    /// Discord JSON error code, if this error came from a refused request
    pub fn platform_code(&self) -> Option<i64> {
        match self {
            MovieNightError::Platform { code, .. } => Some(*code),
            #[cfg(feature = "native")]
            MovieNightError::SerenityError(serenity::Error::Http(
                serenity::http::HttpError::UnsuccessfulRequest(response),
            )) => Some(response.error.code as i64),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MovieNightError::MissingSetting("DISCORD_API_TOKEN".to_string());
        assert!(err.to_string().contains("DISCORD_API_TOKEN"));
    }

    #[test]
    fn test_cannot_dm_detection() {
        let err = MovieNightError::Platform {
            code: CANNOT_MESSAGE_USER,
            message: "Cannot send messages to this user".to_string(),
        };
        assert!(err.is_cannot_dm());

        let err = MovieNightError::Platform {
            code: 50013,
            message: "Missing Permissions".to_string(),
        };
        assert!(!err.is_cannot_dm());
        assert_eq!(err.platform_code(), Some(50013));

        assert!(!MovieNightError::Internal("boom".to_string()).is_cannot_dm());
    }
}
