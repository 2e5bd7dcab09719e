//! Dispatch envelope
//!
//! [`Dispatcher::handle`] is the single entry point for an incoming message.
//! It routes, gates, runs the action and delivers its reply, and it is the one
//! place where failures are caught: whatever happens inside an action, the
//! caller gets a [`DispatchOutcome`] back and the message loop keeps going.

use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::actions::InvocationContext;
use crate::client::ChatClient;
use crate::error::MovieNightError;
use crate::gate::{check_eligibility, DenyReason, Eligibility};
use crate::registry::ActionRegistry;
use crate::reply::{deliver, notify, OutboundMessage, ReplyDirective, ReplyTarget};
use crate::router::{self, ParsedCommand};
use crate::store::SettingsStore;
use crate::types::IncomingMessage;

/// The one message users see when something breaks
pub const GENERIC_FAILURE_NOTICE: &str = "Oops! Something went wrong on our end. \
     The code monkeys at headquarters are working very hard to fix this!";

/// How one dispatch ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The message was not a command
    Ignored,
    /// No action has that name; the user was told so
    UnknownCommand,
    /// The gate refused the invocation
    Denied(DenyReason),
    /// The action's reply was sent to its target
    Delivered,
    /// A DM to the author was refused and the reply went to the channel instead
    Rerouted,
    /// The action or its delivery failed; the user got a failure notice
    Failed,
    /// The action returned no reply or an empty one, which is a bug in the action
    ProtocolError,
}

/// Runs commands for incoming messages
pub struct Dispatcher {
    registry: Arc<ActionRegistry>,
    store: Arc<dyn SettingsStore>,
    client: Arc<dyn ChatClient>,
    prefix: String,
}

impl Dispatcher {
    /// Create a dispatcher over a registry built once at startup
    pub fn new(
        registry: Arc<ActionRegistry>,
        store: Arc<dyn SettingsStore>,
        client: Arc<dyn ChatClient>,
        prefix: impl Into<String>,
    ) -> Self {
        Self {
            registry,
            store,
            client,
            prefix: prefix.into(),
        }
    }

    /// The registry this dispatcher resolves commands against
    pub fn registry(&self) -> &ActionRegistry {
        &self.registry
    }

    /// The command prefix
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Handle one incoming message. Never fails and never panics outward.
    pub async fn handle(&self, message: &IncomingMessage) -> DispatchOutcome {
        let Some(command) = router::parse(&message.content, &self.prefix) else {
            return DispatchOutcome::Ignored;
        };

        let span = info_span!(
            "dispatch",
            invocation = %Uuid::new_v4(),
            command = command.name,
            author = %message.author.name
        );
        let outcome = self.run(message, command).instrument(span).await;
        debug!(?outcome, "Dispatch finished");
        outcome
    }

    async fn run(&self, message: &IncomingMessage, command: ParsedCommand<'_>) -> DispatchOutcome {
        let Some(action) = self.registry.lookup(command.name) else {
            debug!("Unknown command {}", command.name);
            let text = format!(
                "Unknown command {} given, try reading the tutorial at `{}help` \
                 to see what commands are available!",
                command.name, self.prefix
            );
            notify(self.client.as_ref(), ReplyTarget::Channel(message.channel_id), &text).await;
            return DispatchOutcome::UnknownCommand;
        };

        let context = InvocationContext::new(message, command.name, command.remainder);
        let policy = match check_eligibility(
            &context,
            action.as_ref(),
            self.client.as_ref(),
            self.store.as_ref(),
        )
        .await
        {
            Eligibility::Allowed(policy) => policy,
            Eligibility::Denied(reason) => return DispatchOutcome::Denied(reason),
        };

        info!(
            "Running action {} on {} from user {}",
            action.name(),
            message.guild_name.as_deref().unwrap_or("DM"),
            message.author.name
        );
        debug!(?policy, "Server settings for invocation");

        let result = match AssertUnwindSafe(action.execute(&context)).catch_unwind().await {
            Ok(result) => result,
            Err(panic) => Err(MovieNightError::Internal(format!(
                "action {} panicked: {}",
                action.name(),
                panic_message(panic.as_ref())
            ))),
        };

        match result {
            Ok(Some(directive)) => match deliver(&self.client, &directive, policy.as_ref()).await {
                Ok(_) => DispatchOutcome::Delivered,
                Err(MovieNightError::EmptyReply) => {
                    error!("Action {} returned an empty reply", action.name());
                    DispatchOutcome::ProtocolError
                }
                Err(e) => self.recover(message, Some(&directive), e).await,
            },
            Ok(None) => {
                error!("Action {} did not return a reply directive", action.name());
                DispatchOutcome::ProtocolError
            }
            Err(e) => self.recover(message, None, e).await,
        }
    }

    /// Turn a failure into a user-visible notice
    async fn recover(
        &self,
        message: &IncomingMessage,
        directive: Option<&ReplyDirective>,
        err: MovieNightError,
    ) -> DispatchOutcome {
        let channel = ReplyTarget::Channel(message.channel_id);

        if !err.is_cannot_dm() {
            error!(error = ?err, "Action failed");
            notify(self.client.as_ref(), channel, GENERIC_FAILURE_NOTICE).await;
            return DispatchOutcome::Failed;
        }

        match directive {
            Some(directive) if directive.target == ReplyTarget::User(message.author.id) => {
                debug!("DMs closed for {}, replying in channel", message.author.name);
                let outbound = OutboundMessage::from(&directive.payload);
                match self.client.send(channel, &outbound).await {
                    Ok(_) => DispatchOutcome::Rerouted,
                    Err(e) => {
                        warn!("Failed to reroute reply to channel: {}", e);
                        DispatchOutcome::Failed
                    }
                }
            }
            _ => {
                let text = format!("I can't DM you {}!", message.author.name);
                notify(self.client.as_ref(), channel, &text).await;
                DispatchOutcome::Failed
            }
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s
    } else {
        "unknown panic"
    }
}
