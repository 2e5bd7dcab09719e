//! Set admin role action

use async_trait::async_trait;
use std::sync::Arc;

use super::{Action, InvocationContext};
use crate::error::Result;
use crate::reply::ReplyDirective;
use crate::store::SettingsStore;

/// Action that changes which role may run admin commands
pub struct SetAdminRoleAction {
    store: Arc<dyn SettingsStore>,
}

impl SetAdminRoleAction {
    /// Create the action over a settings store
    pub fn new(store: Arc<dyn SettingsStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Action for SetAdminRoleAction {
    fn name(&self) -> &str {
        "set_admin_role"
    }

    fn requires_admin(&self) -> bool {
        true
    }

    fn guild_only(&self) -> bool {
        true
    }

    fn help_text(&self) -> &str {
        "Sets the role whose members may run admin commands."
    }

    fn help_options(&self) -> Vec<&str> {
        vec!["role name"]
    }

    async fn execute(&self, context: &InvocationContext<'_>) -> Result<Option<ReplyDirective>> {
        let role = context.message_text();
        if role.is_empty() {
            return Ok(Some(context.reply("Failed: Give the name of the admin role.")));
        }

        let stored = role.clone();
        self.store
            .update_server_policy(
                context.guild_id()?,
                Box::new(move |policy| {
                    policy.admin_role = stored;
                    Ok(())
                }),
            )
            .await?;

        Ok(Some(context.reply(format!("Admin role set to `{}`", role))))
    }
}
