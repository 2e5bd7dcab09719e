//! Per-guild settings and vote storage
//!
//! The dispatch core only reads [`ServerPolicy`] records. Actions that change
//! settings go through [`SettingsStore::update_server_policy`], which applies
//! an edit atomically: either the whole edit lands or nothing does.
//!
//! Concurrent dispatches are not ordered against each other, so an action
//! that must see a consistent vote (cancelling one, for instance) relies on
//! [`VoteStore::cancel_vote`] doing its lookup and removal as one step.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::error::{MovieNightError, Result};
use crate::types::{ServerPolicy, Snowflake, VoteRecord};

/// Edit applied inside [`SettingsStore::update_server_policy`]
pub type PolicyUpdate = Box<dyn FnOnce(&mut ServerPolicy) -> Result<()> + Send>;

/// Persistence collaborator for server settings
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Load a guild's settings; `PolicyNotFound` when none exist
    async fn get_server_policy(&self, guild_id: Snowflake) -> Result<ServerPolicy>;

    /// Insert or replace a guild's settings
    async fn put_server_policy(&self, policy: ServerPolicy) -> Result<()>;

    /// Read-modify-write a guild's settings as one transaction.
    ///
    /// If `update` fails the stored record is left untouched and the error
    /// is returned. On success the updated record is returned.
    async fn update_server_policy(
        &self,
        guild_id: Snowflake,
        update: PolicyUpdate,
    ) -> Result<ServerPolicy>;
}

/// Process-local [`SettingsStore`]
#[derive(Debug, Default)]
pub struct InMemorySettingsStore {
    policies: RwLock<HashMap<Snowflake, ServerPolicy>>,
}

impl InMemorySettingsStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of guilds with stored settings
    pub async fn len(&self) -> usize {
        self.policies.read().await.len()
    }

    /// Whether no guild has settings yet
    pub async fn is_empty(&self) -> bool {
        self.policies.read().await.is_empty()
    }
}

#[async_trait]
impl SettingsStore for InMemorySettingsStore {
    async fn get_server_policy(&self, guild_id: Snowflake) -> Result<ServerPolicy> {
        self.policies
            .read()
            .await
            .get(&guild_id)
            .cloned()
            .ok_or(MovieNightError::PolicyNotFound(guild_id))
    }

    async fn put_server_policy(&self, policy: ServerPolicy) -> Result<()> {
        self.policies.write().await.insert(policy.guild_id, policy);
        Ok(())
    }

    async fn update_server_policy(
        &self,
        guild_id: Snowflake,
        update: PolicyUpdate,
    ) -> Result<ServerPolicy> {
        let mut policies = self.policies.write().await;
        let stored = policies
            .get_mut(&guild_id)
            .ok_or(MovieNightError::PolicyNotFound(guild_id))?;

        let mut draft = stored.clone();
        update(&mut draft)?;
        if draft.guild_id != guild_id {
            return Err(MovieNightError::Internal(
                "Settings update tried to change the guild id".to_string(),
            ));
        }
        *stored = draft.clone();
        Ok(draft)
    }
}

/// Persistence collaborator for open votes, one per guild at most
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VoteStore: Send + Sync {
    /// The guild's open vote, if any
    async fn get_vote(&self, guild_id: Snowflake) -> Result<Option<VoteRecord>>;

    /// Record a newly opened vote; `VoteAlreadyRunning` if one is open
    async fn start_vote(&self, vote: VoteRecord) -> Result<()>;

    /// Look up and close the guild's vote in one transaction.
    ///
    /// Returns the closed vote, or `None` when no vote was open. Of two
    /// concurrent calls for the same guild at most one gets `Some`.
    async fn cancel_vote(&self, guild_id: Snowflake) -> Result<Option<VoteRecord>>;
}

/// Process-local [`VoteStore`]
#[derive(Debug, Default)]
pub struct InMemoryVoteStore {
    votes: RwLock<HashMap<Snowflake, VoteRecord>>,
}

impl InMemoryVoteStore {
    /// Create a store with no open votes
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VoteStore for InMemoryVoteStore {
    async fn get_vote(&self, guild_id: Snowflake) -> Result<Option<VoteRecord>> {
        Ok(self.votes.read().await.get(&guild_id).cloned())
    }

    async fn start_vote(&self, vote: VoteRecord) -> Result<()> {
        let mut votes = self.votes.write().await;
        if votes.contains_key(&vote.guild_id) {
            return Err(MovieNightError::VoteAlreadyRunning(vote.guild_id));
        }
        votes.insert(vote.guild_id, vote);
        Ok(())
    }

    async fn cancel_vote(&self, guild_id: Snowflake) -> Result<Option<VoteRecord>> {
        Ok(self.votes.write().await.remove(&guild_id))
    }
}
