//! Server settings action

use async_trait::async_trait;
use std::sync::Arc;

use super::{Action, InvocationContext};
use crate::error::Result;
use crate::reply::{ReplyDirective, ReplyPayload, SendOptions};
use crate::store::SettingsStore;
use crate::types::{Embed, ServerPolicy};

/// Action that shows the guild's current settings
pub struct ServerSettingsAction {
    store: Arc<dyn SettingsStore>,
}

impl ServerSettingsAction {
    /// Create the action over a settings store
    pub fn new(store: Arc<dyn SettingsStore>) -> Self {
        Self { store }
    }
}

fn settings_embed(policy: &ServerPolicy) -> Embed {
    let timeout = if policy.auto_delete_enabled() {
        format!("{}s", policy.message_timeout)
    } else {
        "off".to_string()
    };

    Embed::titled("Movie Night Settings")
        .field("Channel", format!("<#{}>", policy.channel), true)
        .field("Admin role", policy.admin_role.clone(), true)
        .field("Message cleanup", timeout, true)
        .field("Votes per user", policy.num_votes_per_user.to_string(), true)
        .field("Movies per vote", policy.num_movies_per_vote.to_string(), true)
}

#[async_trait]
impl Action for ServerSettingsAction {
    fn name(&self) -> &str {
        "server_settings"
    }

    fn requires_admin(&self) -> bool {
        false
    }

    fn guild_only(&self) -> bool {
        true
    }

    fn help_text(&self) -> &str {
        "Shows this server's movie night settings."
    }

    fn help_options(&self) -> Vec<&str> {
        Vec::new()
    }

    async fn execute(&self, context: &InvocationContext<'_>) -> Result<Option<ReplyDirective>> {
        let policy = self.store.get_server_policy(context.guild_id()?).await?;

        Ok(Some(ReplyDirective::to_channel(
            context.channel_id(),
            ReplyPayload::Options(SendOptions {
                content: None,
                embed: Some(settings_embed(&policy)),
                tts: false,
            }),
        )))
    }
}
