//! Discord service implementation
//!
//! Connects to the gateway, turns serenity messages into [`IncomingMessage`]
//! values and hands each one to the [`Dispatcher`]. Serenity runs every event
//! handler call on its own task, so one slow command never holds up another.

use async_trait::async_trait;
use serenity::all::{ChannelType, Guild, ShardManager};
use serenity::client::{Client, Context, EventHandler};
use serenity::http::Http;
use serenity::model::channel::Message;
use serenity::model::gateway::Ready;
use serenity::prelude::GatewayIntents;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use crate::actions::builtin_actions;
use crate::client::{ChatClient, SerenityClient};
use crate::config::BotConfig;
use crate::dispatch::Dispatcher;
use crate::error::{MovieNightError, Result};
use crate::registry::ActionRegistry;
use crate::store::{SettingsStore, VoteStore};
use crate::types::{Author, IncomingMessage, ServerPolicy, Snowflake};

/// Discord service state
#[derive(Default)]
struct ServiceState {
    is_running: bool,
    shard_manager: Option<Arc<ShardManager>>,
}

/// Serenity event handler feeding the dispatcher
struct MovieNightHandler {
    config: BotConfig,
    store: Arc<dyn SettingsStore>,
    dispatcher: Arc<Dispatcher>,
}

/// Build the platform-neutral view of a gateway message.
///
/// Role names and the administrator flag come from the guild cache; the
/// guild owner always counts as an administrator.
fn incoming_message(ctx: &Context, msg: &Message) -> Result<IncomingMessage> {
    let mut guild_name = None;
    let mut is_administrator = false;
    let mut role_names = Vec::new();

    if let Some(guild_id) = msg.guild_id {
        if let Some(guild) = ctx.cache.guild(guild_id) {
            guild_name = Some(guild.name.clone());
            is_administrator = guild.owner_id == msg.author.id;
            let member_roles = msg.member.as_ref().map(|m| m.roles.as_slice()).unwrap_or(&[]);
            for role in member_roles.iter().filter_map(|id| guild.roles.get(id)) {
                is_administrator |= role.permissions.administrator();
                role_names.push(role.name.clone());
            }
        }
    }

    Ok(IncomingMessage {
        id: Snowflake::new(msg.id.get())?,
        channel_id: Snowflake::new(msg.channel_id.get())?,
        guild_id: msg.guild_id.map(|g| Snowflake::new(g.get())).transpose()?,
        guild_name,
        author: Author {
            id: Snowflake::new(msg.author.id.get())?,
            name: msg.author.name.clone(),
            is_administrator,
            role_names,
        },
        content: msg.content.clone(),
    })
}

/// Default settings for a guild: system channel, else the topmost text channel
fn default_policy(guild: &Guild, admin_role: &str) -> Option<ServerPolicy> {
    let channel = guild.system_channel_id.or_else(|| {
        guild
            .channels
            .values()
            .filter(|c| c.kind == ChannelType::Text)
            .min_by_key(|c| c.position)
            .map(|c| c.id)
    })?;

    Some(ServerPolicy::new(
        Snowflake::new(guild.id.get()).ok()?,
        Snowflake::new(channel.get()).ok()?,
        admin_role,
    ))
}

#[async_trait]
impl EventHandler for MovieNightHandler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!(
            "Movie night bot connected as {} in {} guilds",
            ready.user.name,
            ready.guilds.len()
        );
    }

    async fn guild_create(&self, _ctx: Context, guild: Guild, _is_new: Option<bool>) {
        let Ok(guild_id) = Snowflake::new(guild.id.get()) else {
            return;
        };

        match self.store.get_server_policy(guild_id).await {
            Ok(_) => debug!("Settings already exist for guild {}", guild.name),
            Err(MovieNightError::PolicyNotFound(_)) => {
                let Some(policy) = default_policy(&guild, &self.config.default_admin_role) else {
                    warn!("Guild {} has no text channel for the bot", guild.name);
                    return;
                };
                info!("Creating default settings for guild {}", guild.name);
                if let Err(e) = self.store.put_server_policy(policy).await {
                    error!("Failed to store settings for guild {}: {}", guild.name, e);
                }
            }
            Err(e) => error!("Failed to read settings for guild {}: {}", guild.name, e),
        }
    }

    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.id == ctx.cache.current_user().id {
            return;
        }

        if msg.author.bot && self.config.should_ignore_bot_messages {
            debug!("Ignoring bot message from {}", msg.author.name);
            return;
        }

        let message = match incoming_message(&ctx, &msg) {
            Ok(message) => message,
            Err(e) => {
                warn!("Dropping message {}: {}", msg.id, e);
                return;
            }
        };

        self.dispatcher.handle(&message).await;
    }
}

/// Movie night bot service
///
/// Owns the action registry for the life of the process and runs the
/// serenity client in the background.
pub struct MovieNightService {
    config: BotConfig,
    store: Arc<dyn SettingsStore>,
    dispatcher: Arc<Dispatcher>,
    state: Arc<RwLock<ServiceState>>,
}

impl MovieNightService {
    /// Create the service, building the action registry and dispatcher once.
    ///
    /// Actions and the dispatcher share one REST client, separate from the
    /// gateway connection opened by [`start`](Self::start).
    pub fn new(
        config: BotConfig,
        store: Arc<dyn SettingsStore>,
        votes: Arc<dyn VoteStore>,
    ) -> Self {
        let client: Arc<dyn ChatClient> =
            Arc::new(SerenityClient::new(Arc::new(Http::new(&config.token))));
        let registry = Arc::new(ActionRegistry::discover(builtin_actions(
            store.clone(),
            votes,
            client.clone(),
            &config.command_prefix,
        )));
        let dispatcher = Arc::new(Dispatcher::new(
            registry,
            store.clone(),
            client,
            config.command_prefix.clone(),
        ));

        Self {
            config,
            store,
            dispatcher,
            state: Arc::new(RwLock::new(ServiceState::default())),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &BotConfig {
        &self.config
    }

    /// The registry every dispatch resolves commands against
    pub fn registry(&self) -> &ActionRegistry {
        self.dispatcher.registry()
    }

    /// Check if the service is running
    pub async fn is_running(&self) -> bool {
        self.state.read().await.is_running
    }

    /// Connect to Discord and start handling messages in the background
    pub async fn start(&mut self) -> Result<()> {
        if self.state.read().await.is_running {
            return Err(MovieNightError::AlreadyRunning);
        }

        self.config.validate()?;

        info!("Starting movie night service...");

        let intents = GatewayIntents::GUILDS
            | GatewayIntents::GUILD_MESSAGES
            | GatewayIntents::MESSAGE_CONTENT
            | GatewayIntents::DIRECT_MESSAGES;

        let handler = MovieNightHandler {
            config: self.config.clone(),
            store: self.store.clone(),
            dispatcher: self.dispatcher.clone(),
        };

        let mut client = Client::builder(&self.config.token, intents)
            .event_handler(handler)
            .await
            .map_err(|e| MovieNightError::ConnectionFailed(e.to_string()))?;

        {
            let mut state = self.state.write().await;
            state.shard_manager = Some(client.shard_manager.clone());
            state.is_running = true;
        }

        let state = self.state.clone();
        tokio::spawn(async move {
            if let Err(why) = client.start().await {
                error!("Client error: {:?}", why);
            }
            state.write().await.is_running = false;
        });

        info!("Movie night service started");
        Ok(())
    }

    /// Disconnect from Discord
    pub async fn stop(&mut self) -> Result<()> {
        info!("Stopping movie night service...");

        let shard_manager = {
            let mut state = self.state.write().await;
            state.is_running = false;
            state.shard_manager.take()
        };

        match shard_manager {
            Some(manager) => manager.shutdown_all().await,
            None => return Err(MovieNightError::ClientNotInitialized),
        }

        info!("Movie night service stopped");
        Ok(())
    }
}
