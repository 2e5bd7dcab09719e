//! User vote count action

use async_trait::async_trait;
use std::sync::Arc;

use super::{Action, InvocationContext};
use crate::error::{MovieNightError, Result};
use crate::reply::ReplyDirective;
use crate::store::SettingsStore;

/// Action that sets how many votes each member may cast
pub struct UserVoteCountAction {
    store: Arc<dyn SettingsStore>,
}

impl UserVoteCountAction {
    /// Create the action over a settings store
    pub fn new(store: Arc<dyn SettingsStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Action for UserVoteCountAction {
    fn name(&self) -> &str {
        "user_vote_count"
    }

    fn requires_admin(&self) -> bool {
        true
    }

    fn guild_only(&self) -> bool {
        true
    }

    fn help_text(&self) -> &str {
        "Sets the number of votes each member may cast. Can only be raised, never lowered."
    }

    fn help_options(&self) -> Vec<&str> {
        vec!["#"]
    }

    async fn execute(&self, context: &InvocationContext<'_>) -> Result<Option<ReplyDirective>> {
        let votes = match context.message_text().parse::<u32>() {
            Ok(n) if n >= 1 => n,
            _ => {
                return Ok(Some(context.reply(
                    "Failed: Number of votes per user must be greater than zero.",
                )))
            }
        };

        let updated = self
            .store
            .update_server_policy(
                context.guild_id()?,
                Box::new(move |policy| {
                    if votes < policy.num_votes_per_user {
                        return Err(MovieNightError::ValidationFailed(format!(
                            "Number of votes per user must be >= {}",
                            policy.num_votes_per_user
                        )));
                    }
                    policy.num_votes_per_user = votes;
                    Ok(())
                }),
            )
            .await;

        match updated {
            Ok(policy) => Ok(Some(context.reply(format!(
                "Number of votes per user updated to {}",
                policy.num_votes_per_user
            )))),
            Err(MovieNightError::ValidationFailed(reason)) => {
                Ok(Some(context.reply(format!("Failed to update: {}", reason))))
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reply::ReplyPayload;
    use crate::store::InMemorySettingsStore;
    use crate::testing::{guild_message, seeded_store};

    async fn run(store: Arc<InMemorySettingsStore>, text: &str) -> String {
        let action = UserVoteCountAction::new(store);
        let message = guild_message(text);
        let context = InvocationContext::new(&message, "user_vote_count", "");
        let directive = action.execute(&context).await.unwrap().unwrap();
        match directive.payload {
            ReplyPayload::Text(text) => text,
            other => panic!("unexpected payload {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_raises_vote_count() {
        let store = seeded_store().await;
        let reply = run(store.clone(), "m!user_vote_count 6").await;
        assert_eq!(reply, "Number of votes per user updated to 6");

        let policy = store
            .get_server_policy(guild_message("").guild_id.unwrap())
            .await
            .unwrap();
        assert_eq!(policy.num_votes_per_user, 6);
    }

    #[tokio::test]
    async fn test_rejects_zero_and_garbage() {
        let store = seeded_store().await;
        assert!(run(store.clone(), "m!user_vote_count 0").await.starts_with("Failed:"));
        assert!(run(store.clone(), "m!user_vote_count lots").await.starts_with("Failed:"));
        assert!(run(store, "m!user_vote_count").await.starts_with("Failed:"));
    }

    #[tokio::test]
    async fn test_refuses_to_lower() {
        let store = seeded_store().await;
        let reply = run(store.clone(), "m!user_vote_count 2").await;
        assert_eq!(reply, "Failed to update: Number of votes per user must be >= 4");
    }
}
