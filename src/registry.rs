//! Action registry
//!
//! Built once during startup from an explicit list of actions and shared
//! read-only (behind an `Arc`) with every dispatch for the rest of the
//! process lifetime. Nothing mutates it after [`ActionRegistry::discover`].

use regex::Regex;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};
use tracing::{debug, warn};

use crate::actions::Action;

fn command_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[a-z0-9_]+$").expect("static regex is valid"))
}

/// Whether `name` can be typed as a command token
pub fn is_valid_command_name(name: &str) -> bool {
    command_name_pattern().is_match(name)
}

/// Lookup table from command name to action
#[derive(Default)]
pub struct ActionRegistry {
    actions: HashMap<String, Arc<dyn Action>>,
}

impl ActionRegistry {
    /// Index actions by their declared names.
    ///
    /// Actions with an empty or malformed name are skipped. When two actions
    /// share a name the later one wins. Both cases are logged.
    pub fn discover(actions: impl IntoIterator<Item = Arc<dyn Action>>) -> Self {
        let mut registry = Self::default();

        for action in actions {
            let name = action.name().to_string();
            if !is_valid_command_name(&name) {
                warn!("Skipping action with invalid name {:?}", name);
                continue;
            }
            if registry.actions.insert(name.clone(), action).is_some() {
                warn!("Duplicate action name {}, keeping the last registered", name);
            }
        }

        debug!("Registered {} actions", registry.actions.len());
        registry
    }

    /// Find an action by command name; `None` is an ordinary unknown command
    pub fn lookup(&self, name: &str) -> Option<Arc<dyn Action>> {
        self.actions.get(name).cloned()
    }

    /// Number of registered actions
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Whether no actions are registered
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Registered names in sorted order
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.actions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl std::fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionRegistry")
            .field("actions", &self.names())
            .finish()
    }
}
