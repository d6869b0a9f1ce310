mod bot;
use std::{sync::Arc, time::Duration};
use bot::{load_commands, run_discord_bot, state::def::{AppState, BotConfig}};
use tokio::time::sleep;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match BotConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{e}");
            std::process::exit(1);
        }
    };
    if config.owner_ids.is_empty() {
        warn!("OWNER_IDS is empty, nobody can invoke sync or reload from chat");
    }

    let state = Arc::new(AppState::new(config));
    info!("Chat functions: {}", state.functions.names().join(", "));
    load_commands(&state).await;

    //Loop so a gateway error doesn't take the bot down
    loop {
        if let Err(e) = run_discord_bot(state.clone()).await {
            tracing::error!("Discord client error: {e:?}");
        }
        info!("Restarting Discord client!");
        sleep(Duration::from_secs(5)).await;
    }
}
