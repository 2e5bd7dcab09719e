//! Movie night actions
//!
//! Every command the bot understands is an [`Action`]. Actions are built once
//! at startup by [`builtin_actions`] and indexed by
//! [`ActionRegistry`](crate::registry::ActionRegistry).

mod cancel_vote;
mod help;
mod message_timeout;
mod server_settings;
mod set_admin_role;
mod user_vote_count;

pub use cancel_vote::{CancelVoteAction, VOTE_CANCELLED_TEXT};
pub use help::{HelpAction, HelpEntry};
pub use message_timeout::MessageTimeoutAction;
pub use server_settings::ServerSettingsAction;
pub use set_admin_role::SetAdminRoleAction;
pub use user_vote_count::UserVoteCountAction;

use async_trait::async_trait;
use std::sync::Arc;

use crate::client::ChatClient;
use crate::error::{MovieNightError, Result};
use crate::reply::ReplyDirective;
use crate::store::{SettingsStore, VoteStore};
use crate::types::{Author, IncomingMessage, Snowflake};

/// Everything an action sees about one invocation
#[derive(Debug, Clone, Copy)]
pub struct InvocationContext<'a> {
    /// The message that triggered the command
    pub message: &'a IncomingMessage,
    /// Resolved command name
    pub command: &'a str,
    /// Text after the command token, uninterpreted
    pub arguments: &'a str,
}

impl<'a> InvocationContext<'a> {
    /// Bundle a message with its parsed command
    pub fn new(message: &'a IncomingMessage, command: &'a str, arguments: &'a str) -> Self {
        Self {
            message,
            command,
            arguments,
        }
    }

    /// Who invoked the command
    pub fn author(&self) -> &'a Author {
        &self.message.author
    }

    /// Channel the command came from
    pub fn channel_id(&self) -> Snowflake {
        self.message.channel_id
    }

    /// Guild the command came from.
    ///
    /// Guild-only actions never run without one, so a missing guild here is
    /// an internal error rather than user input.
    pub fn guild_id(&self) -> Result<Snowflake> {
        self.message.guild_id.ok_or_else(|| {
            MovieNightError::Internal(format!("{} invoked outside a guild", self.command))
        })
    }

    /// The command's argument text with whitespace collapsed
    pub fn message_text(&self) -> String {
        get_message_text(&self.message.content)
    }

    /// The command's arguments split into at most `data_parts` fields
    pub fn message_data(&self, data_parts: usize) -> Vec<String> {
        get_message_data(&self.message.content, data_parts)
    }

    /// Plain text reply into the invoking channel
    pub fn reply(&self, text: impl Into<String>) -> ReplyDirective {
        ReplyDirective::text(self.channel_id(), text)
    }
}

/// A named command
///
/// Implementations hold no per-invocation state; one instance serves every
/// invocation for the life of the process.
///
/// Every method must be implemented. An action that leaves out `guild_only`
/// does not compile:
///
/// ```compile_fail
/// use async_trait::async_trait;
/// use elizaos_plugin_movienight::{Action, InvocationContext, ReplyDirective, Result};
///
/// struct Undecided;
///
/// #[async_trait]
/// impl Action for Undecided {
///     fn name(&self) -> &str {
///         "undecided"
///     }
///
///     fn requires_admin(&self) -> bool {
///         false
///     }
///
///     fn help_text(&self) -> &str {
///         "Never says where it may run."
///     }
///
///     fn help_options(&self) -> Vec<&str> {
///         Vec::new()
///     }
///
///     async fn execute(&self, _context: &InvocationContext<'_>) -> Result<Option<ReplyDirective>> {
///         Ok(None)
///     }
/// }
/// ```
#[async_trait]
pub trait Action: Send + Sync {
    /// Command token users type after the prefix; also the registry key
    fn name(&self) -> &str;

    /// Whether only admins may run the command
    fn requires_admin(&self) -> bool;

    /// Whether the command is refused in direct messages
    fn guild_only(&self) -> bool;

    /// One-line description for generated help
    fn help_text(&self) -> &str;

    /// Placeholder argument names for generated help
    fn help_options(&self) -> Vec<&str>;

    /// Run the command.
    ///
    /// `Ok(None)` means the action produced no reply, which the dispatcher
    /// reports as a defect in the action.
    async fn execute(&self, context: &InvocationContext<'_>) -> Result<Option<ReplyDirective>>;
}

/// Extract whitespace-delimited argument fields from a command message.
///
/// The command token is skipped. At most `data_parts` fields are returned;
/// the last one takes the rest of the line. Runs of whitespace inside a field
/// collapse to a single space.
///
/// ```
/// use elizaos_plugin_movienight::actions::get_message_data;
///
/// assert_eq!(get_message_data("m!suggest Some  Movie Name", 2), vec!["Some", "Movie Name"]);
/// assert!(get_message_data("m!suggest", 2).is_empty());
/// ```
pub fn get_message_data(content: &str, data_parts: usize) -> Vec<String> {
    let mut fields = Vec::new();
    if data_parts == 0 {
        return fields;
    }

    let mut rest = match content.trim().split_once(char::is_whitespace) {
        Some((_, tail)) => tail.trim_start(),
        None => "",
    };

    while !rest.is_empty() && fields.len() + 1 < data_parts {
        match rest.split_once(char::is_whitespace) {
            Some((field, tail)) => {
                fields.push(field.to_string());
                rest = tail.trim_start();
            }
            None => {
                fields.push(rest.to_string());
                rest = "";
            }
        }
    }

    if !rest.is_empty() {
        fields.push(rest.split_whitespace().collect::<Vec<_>>().join(" "));
    }

    fields
}

/// Single-field form of [`get_message_data`]; empty when no data was given
pub fn get_message_text(content: &str) -> String {
    get_message_data(content, 1).pop().unwrap_or_default()
}

/// The declared set of actions, one instance each.
///
/// `help` is built last so its listing covers every other action.
pub fn builtin_actions(
    store: Arc<dyn SettingsStore>,
    votes: Arc<dyn VoteStore>,
    client: Arc<dyn ChatClient>,
    prefix: &str,
) -> Vec<Arc<dyn Action>> {
    let mut actions: Vec<Arc<dyn Action>> = vec![
        Arc::new(CancelVoteAction::new(votes, client)),
        Arc::new(UserVoteCountAction::new(store.clone())),
        Arc::new(MessageTimeoutAction::new(store.clone())),
        Arc::new(SetAdminRoleAction::new(store.clone())),
        Arc::new(ServerSettingsAction::new(store)),
    ];

    let help = HelpAction::new(prefix, &actions);
    actions.push(Arc::new(help));
    actions
}
