//! Help action

use async_trait::async_trait;
use std::sync::Arc;

use super::{Action, InvocationContext};
use crate::error::Result;
use crate::reply::{ReplyDirective, ReplyPayload, SendOptions};
use crate::types::Embed;

const HELP_COLOR: u32 = 0x5865F2;

const HELP_TEXT: &str = "Sends you this list of commands.";

/// Help listing for one action, captured at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelpEntry {
    /// Command name
    pub name: String,
    /// Placeholder argument names
    pub options: Vec<String>,
    /// Description
    pub text: String,
    /// Whether the command is admin-only
    pub admin: bool,
}

impl HelpEntry {
    fn describe(action: &dyn Action) -> Self {
        Self {
            name: action.name().to_string(),
            options: action.help_options().iter().map(|o| o.to_string()).collect(),
            text: action.help_text().to_string(),
            admin: action.requires_admin(),
        }
    }

    /// Usage line such as `m!user_vote_count <#>`
    pub fn usage(&self, prefix: &str) -> String {
        let mut usage = format!("{}{}", prefix, self.name);
        for option in &self.options {
            usage.push_str(&format!(" <{}>", option));
        }
        usage
    }
}

/// Action that DMs the invoking user a list of commands
pub struct HelpAction {
    prefix: String,
    entries: Vec<HelpEntry>,
}

impl HelpAction {
    /// Build the listing from the other registered actions
    pub fn new(prefix: &str, actions: &[Arc<dyn Action>]) -> Self {
        let mut entries: Vec<HelpEntry> = actions
            .iter()
            .map(|a| HelpEntry::describe(a.as_ref()))
            .collect();
        entries.push(HelpEntry {
            name: "help".to_string(),
            options: Vec::new(),
            text: HELP_TEXT.to_string(),
            admin: false,
        });
        entries.sort_by(|a, b| a.name.cmp(&b.name));

        Self {
            prefix: prefix.to_string(),
            entries,
        }
    }

    /// The captured listing, sorted by name
    pub fn entries(&self) -> &[HelpEntry] {
        &self.entries
    }

    fn embed(&self) -> Embed {
        let mut embed = Embed::titled("Movie Night Bot Commands")
            .description("Commands are only answered in the server's movie night channel.")
            .color(HELP_COLOR);
        for entry in &self.entries {
            let text = if entry.admin {
                format!("{} *(admin only)*", entry.text)
            } else {
                entry.text.clone()
            };
            embed = embed.field(entry.usage(&self.prefix), text, false);
        }
        embed
    }
}

#[async_trait]
impl Action for HelpAction {
    fn name(&self) -> &str {
        "help"
    }

    fn requires_admin(&self) -> bool {
        false
    }

    fn guild_only(&self) -> bool {
        false
    }

    fn help_text(&self) -> &str {
        HELP_TEXT
    }

    fn help_options(&self) -> Vec<&str> {
        Vec::new()
    }

    async fn execute(&self, context: &InvocationContext<'_>) -> Result<Option<ReplyDirective>> {
        let payload = ReplyPayload::Options(SendOptions {
            content: None,
            embed: Some(self.embed()),
            tts: false,
        });

        let mut directive = ReplyDirective::to_user(context.author().id, payload);
        if !context.message.is_direct_message() {
            directive = directive.also_delete([context.message.message_ref()]);
        }
        Ok(Some(directive))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reply::ReplyTarget;
    use crate::testing::{builtins, guild_message};

    #[tokio::test]
    async fn test_help_lists_every_action_and_dms_author() {
        let actions = builtins(Arc::new(crate::store::InMemorySettingsStore::new()));
        let help = actions
            .iter()
            .find(|a| a.name() == "help")
            .unwrap()
            .clone();

        let message = guild_message("m!help");
        let context = InvocationContext::new(&message, "help", "");
        let directive = help.execute(&context).await.unwrap().unwrap();

        assert_eq!(directive.target, ReplyTarget::User(message.author.id));
        assert_eq!(directive.also_delete, vec![message.message_ref()]);

        let ReplyPayload::Options(opts) = directive.payload else {
            panic!("help should send an embed");
        };
        let embed = opts.embed.unwrap();
        assert_eq!(embed.fields.len(), actions.len());
        assert!(embed
            .fields
            .iter()
            .any(|f| f.name == "m!user_vote_count <#>" && f.value.contains("admin only")));
    }

    #[test]
    fn test_usage_line() {
        let entry = HelpEntry {
            name: "set_admin_role".to_string(),
            options: vec!["role name".to_string()],
            text: String::new(),
            admin: true,
        };
        assert_eq!(entry.usage("m!"), "m!set_admin_role <role name>");
    }

    #[test]
    fn test_own_entry_matches_help_text() {
        let help = HelpAction::new("m!", &[]);
        let entry = help.entries().iter().find(|e| e.name == "help").unwrap();
        assert_eq!(entry.text, help.help_text());
        assert_eq!(entry.usage("m!"), "m!help");
    }
}
