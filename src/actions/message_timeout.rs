//! Message timeout action

use async_trait::async_trait;
use std::sync::Arc;

use super::{Action, InvocationContext};
use crate::error::Result;
use crate::reply::ReplyDirective;
use crate::store::SettingsStore;

/// Upper bound on the cleanup delay, one day
const MAX_TIMEOUT_SECS: u64 = 86_400;

/// Action that sets how long bot chatter stays before being deleted
pub struct MessageTimeoutAction {
    store: Arc<dyn SettingsStore>,
}

impl MessageTimeoutAction {
    /// Create the action over a settings store
    pub fn new(store: Arc<dyn SettingsStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Action for MessageTimeoutAction {
    fn name(&self) -> &str {
        "message_timeout"
    }

    fn requires_admin(&self) -> bool {
        true
    }

    fn guild_only(&self) -> bool {
        true
    }

    fn help_text(&self) -> &str {
        "Seconds before command messages are cleaned up. 0 keeps them forever."
    }

    fn help_options(&self) -> Vec<&str> {
        vec!["seconds"]
    }

    async fn execute(&self, context: &InvocationContext<'_>) -> Result<Option<ReplyDirective>> {
        let timeout = match context.message_text().parse::<u64>() {
            Ok(secs) if secs <= MAX_TIMEOUT_SECS => secs,
            _ => {
                return Ok(Some(context.reply(format!(
                    "Failed: Timeout must be a whole number of seconds between 0 and {}.",
                    MAX_TIMEOUT_SECS
                ))))
            }
        };

        self.store
            .update_server_policy(
                context.guild_id()?,
                Box::new(move |policy| {
                    policy.message_timeout = timeout;
                    Ok(())
                }),
            )
            .await?;

        let text = if timeout == 0 {
            "Message cleanup disabled".to_string()
        } else {
            format!("Message timeout updated to {} seconds", timeout)
        };
        Ok(Some(
            context
                .reply(text)
                .also_delete([context.message.message_ref()]),
        ))
    }
}
