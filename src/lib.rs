//! Movie night bot for Discord
//!
//! This crate provides the command dispatch core of a Discord bot that runs
//! movie nights: it matches `m!`-prefixed messages against a registry of
//! actions, enforces per-server channel and admin policy, runs the action and
//! delivers its reply, recovering from failures along the way.

#![allow(clippy::result_large_err)]
//!
//! # Features
//!
//! - `native`: Discord gateway and REST support using Serenity (default)
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use elizaos_plugin_movienight::{
//!     BotConfig, InMemorySettingsStore, InMemoryVoteStore, MovieNightService,
//! };
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = BotConfig::from_env().expect("Missing Discord credentials");
//!     let mut service = MovieNightService::new(
//!         config,
//!         Arc::new(InMemorySettingsStore::new()),
//!         Arc::new(InMemoryVoteStore::new()),
//!     );
//!     service.start().await.expect("Failed to start movie night service");
//! }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod actions;
pub mod client;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod gate;
pub mod registry;
pub mod reply;
pub mod router;
pub mod store;
pub mod types;

/// Discord service implementation (native-only).
#[cfg(feature = "native")]
pub mod service;

#[cfg(test)]
mod testing;

// Re-exports for convenience
pub use actions::{Action, InvocationContext};
pub use client::ChatClient;
pub use config::BotConfig;
pub use dispatch::{DispatchOutcome, Dispatcher};
pub use error::{MovieNightError, Result};
pub use gate::{DenyReason, Eligibility};
pub use registry::ActionRegistry;
pub use reply::{ReplyDirective, ReplyPayload, ReplyTarget, SendOptions};
pub use store::{InMemorySettingsStore, InMemoryVoteStore, SettingsStore, VoteStore};
pub use types::*;

#[cfg(feature = "native")]
pub use client::SerenityClient;
#[cfg(feature = "native")]
pub use service::MovieNightService;

/// Bot name
pub const BOT_NAME: &str = "movienight";
/// Bot version matching Cargo.toml
pub const BOT_VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_matches_manifest() {
        assert_eq!(BOT_VERSION, "2.0.0");
        assert_eq!(BOT_NAME, "movienight");
    }
}
