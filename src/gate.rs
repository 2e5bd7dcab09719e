//! Permission gate
//!
//! Decides whether one invocation may run. Checks run in a fixed order and
//! stop at the first failure:
//!
//! 1. guild-only actions are refused in DMs (the author is told privately)
//! 2. commands outside the guild's bot channel are ignored silently
//! 3. admin actions need the administrator permission or the admin role
//!
//! A settings lookup that fails denies the invocation with a generic notice.

use tracing::{debug, error};

use crate::actions::{Action, InvocationContext};
use crate::client::ChatClient;
use crate::dispatch::GENERIC_FAILURE_NOTICE;
use crate::reply::{notify, ReplyTarget};
use crate::store::SettingsStore;
use crate::types::ServerPolicy;

/// Sent privately when a guild-only command arrives over DM
pub const GUILD_ONLY_NOTICE: &str = "You can't do this command from a DM!";

/// Sent to the channel when a non-admin tries an admin command
pub const NOT_ADMIN_NOTICE: &str = "Hey now, you're not an admin on this server!";

/// Why an invocation was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// Guild-only action invoked from a DM
    GuildOnly,
    /// Message posted outside the configured channel
    WrongChannel,
    /// Admin action invoked by a non-admin
    NotAdmin,
    /// The guild's settings could not be loaded
    PolicyUnavailable,
}

/// Gate verdict
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Eligibility {
    /// Run the action; carries the guild's settings when in a guild
    Allowed(Option<ServerPolicy>),
    /// Do not run the action
    Denied(DenyReason),
}

/// Run the gate for one invocation
pub async fn check_eligibility(
    context: &InvocationContext<'_>,
    action: &dyn Action,
    client: &dyn ChatClient,
    store: &dyn SettingsStore,
) -> Eligibility {
    let author = context.author();

    let Some(guild_id) = context.message.guild_id else {
        if action.guild_only() {
            debug!("User {} trying guild-only action {} in a DM", author.name, action.name());
            notify(client, ReplyTarget::User(author.id), GUILD_ONLY_NOTICE).await;
            return Eligibility::Denied(DenyReason::GuildOnly);
        }
        return Eligibility::Allowed(None);
    };

    let policy = match store.get_server_policy(guild_id).await {
        Ok(policy) => policy,
        Err(e) => {
            error!(error = %e, guild = %guild_id, "Failed to load server settings");
            notify(
                client,
                ReplyTarget::Channel(context.channel_id()),
                GENERIC_FAILURE_NOTICE,
            )
            .await;
            return Eligibility::Denied(DenyReason::PolicyUnavailable);
        }
    };

    if context.channel_id() != policy.channel {
        debug!(
            "User {} using non-permitted channel {} instead of {}",
            author.name,
            context.channel_id(),
            policy.channel
        );
        return Eligibility::Denied(DenyReason::WrongChannel);
    }

    if action.requires_admin() && !author.is_administrator && !author.has_role(&policy.admin_role) {
        debug!("User {} does not have admin", author.name);
        notify(client, ReplyTarget::Channel(context.channel_id()), NOT_ADMIN_NOTICE).await;
        return Eligibility::Denied(DenyReason::NotAdmin);
    }

    Eligibility::Allowed(Some(policy))
}
