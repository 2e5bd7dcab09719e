//! Movie night bot entry point

use anyhow::Context as _;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use elizaos_plugin_movienight::{
    BotConfig, InMemorySettingsStore, InMemoryVoteStore, MovieNightService,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = BotConfig::from_env().context("loading bot configuration")?;
    let mut service = MovieNightService::new(
        config,
        Arc::new(InMemorySettingsStore::new()),
        Arc::new(InMemoryVoteStore::new()),
    );

    service.start().await.context("starting movie night service")?;
    info!("Press Ctrl+C to stop");

    tokio::signal::ctrl_c().await?;
    service.stop().await?;
    Ok(())
}
