use std::sync::Arc;

use serenity::{all::GatewayIntents, Client};
use tracing::info;

use crate::bot::{handler::handler::Handler, state::def::{AppState, BotResult}};

pub mod state;
pub mod dispatcher;
pub mod functions;
pub mod registry;
pub mod platforms;
pub mod handler;
pub mod replies;

/// Loads the configured command directory into the manager.
/// A failed load is logged and leaves the cache empty, `reload` can retry it.
pub async fn load_commands(state: &AppState) {
    if let Err(e) = state.manager.load(&state.config.commands_dir).await {
        tracing::error!("Failed to load commands from {}: {e}", state.config.commands_dir.display());
    }
}

pub async fn run_discord_bot(state: Arc<AppState>) -> BotResult<()> {
    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;

    let mut client = Client::builder(&state.config.discord_token, intents)
        .event_handler(Handler { state: state.clone() })
        .await?;

    info!("Starting Discord client");
    client.start().await?;
    Ok(())
}
