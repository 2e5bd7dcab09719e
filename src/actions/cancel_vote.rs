//! Cancel vote action

use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use super::{Action, InvocationContext};
use crate::client::ChatClient;
use crate::error::Result;
use crate::reply::{OutboundMessage, ReplyDirective};
use crate::store::VoteStore;

/// Replaces the vote message once the vote is called off
pub const VOTE_CANCELLED_TEXT: &str = "The movie vote has been cancelled.";

/// Action that calls off the guild's open vote without picking a winner
pub struct CancelVoteAction {
    votes: Arc<dyn VoteStore>,
    client: Arc<dyn ChatClient>,
}

impl CancelVoteAction {
    /// Create the action over the vote store and the client that owns the vote message
    pub fn new(votes: Arc<dyn VoteStore>, client: Arc<dyn ChatClient>) -> Self {
        Self { votes, client }
    }
}

#[async_trait]
impl Action for CancelVoteAction {
    fn name(&self) -> &str {
        "cancel_vote"
    }

    fn requires_admin(&self) -> bool {
        true
    }

    fn guild_only(&self) -> bool {
        true
    }

    fn help_text(&self) -> &str {
        "Cancels the currently running vote without selecting a winner."
    }

    fn help_options(&self) -> Vec<&str> {
        Vec::new()
    }

    async fn execute(&self, context: &InvocationContext<'_>) -> Result<Option<ReplyDirective>> {
        let guild_id = context.guild_id()?;
        let Some(vote) = self.votes.cancel_vote(guild_id).await? else {
            return Ok(Some(context.reply("No vote started!")));
        };
        info!("Vote cancelled in guild {} by {}", guild_id, context.author().name);

        self.client.clear_reactions(vote.message).await?;
        self.client
            .edit_message(
                vote.message,
                &OutboundMessage {
                    content: Some(VOTE_CANCELLED_TEXT.to_string()),
                    ..OutboundMessage::default()
                },
            )
            .await?;

        Ok(Some(
            context
                .reply("Vote cancelled.")
                .also_delete([context.message.message_ref()]),
        ))
    }
}
