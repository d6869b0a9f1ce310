use std::{collections::HashSet, path::PathBuf, sync::Arc};

use crate::bot::{functions::{functions::FunctionContext, FunctionRegistry}, registry::{manager::ApplicationCommandManager, sync::parse_guild_id}, state::def::{AppState, BotConfig, BotError, BotResult}};

impl BotConfig {
    pub fn from_env() -> BotResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| dotenvy::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> BotResult<Self> {
        let discord_token = lookup("DISCORD_TOKEN")
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| BotError::Config("DISCORD_TOKEN is not set".into()))?;

        let commands_dir = lookup("COMMANDS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("commands"));

        // Captured once so nothing downstream depends on the process cwd
        let base_dir = match lookup("COMMANDS_BASE_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => std::env::current_dir()?,
        };

        let prefix = lookup("COMMAND_PREFIX")
            .filter(|prefix| !prefix.is_empty())
            .unwrap_or_else(|| "!".to_string());

        let sync_guilds = split_list(lookup("SYNC_GUILDS").as_deref())
            .map(|id| {
                parse_guild_id(&id)
                    .map(|_| id.clone())
                    .map_err(|_| BotError::Config(format!("SYNC_GUILDS contains an invalid guild id: {id}")))
            })
            .collect::<BotResult<Vec<_>>>()?;

        let sync_on_ready = match lookup("SYNC_ON_READY") {
            Some(raw) => parse_bool(&raw)
                .ok_or_else(|| BotError::Config(format!("SYNC_ON_READY must be a boolean, got {raw}")))?,
            None => true,
        };

        let owner_ids = split_list(lookup("OWNER_IDS").as_deref())
            .map(|id| {
                id.parse::<u64>()
                    .map_err(|_| BotError::Config(format!("OWNER_IDS contains an invalid user id: {id}")))
            })
            .collect::<BotResult<HashSet<_>>>()?;

        Ok(BotConfig {
            discord_token,
            commands_dir,
            base_dir,
            prefix,
            sync_guilds,
            sync_on_ready,
            owner_ids,
        })
    }

    pub fn is_owner(&self, user_id: u64) -> bool {
        self.owner_ids.contains(&user_id)
    }

    /// Guild targets for a sync, `None` meaning the global scope.
    pub fn sync_targets(&self) -> Option<&[String]> {
        if self.sync_guilds.is_empty() {
            None
        } else {
            Some(&self.sync_guilds)
        }
    }
}

fn split_list(raw: Option<&str>) -> impl Iterator<Item = String> + '_ {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl AppState {
    pub fn new(config: BotConfig) -> Self {
        let manager = ApplicationCommandManager::new(config.base_dir.clone());
        AppState {
            config: Arc::new(config),
            manager: Arc::new(manager),
            functions: Arc::new(FunctionRegistry::new()),
        }
    }

    pub fn function_context(&self) -> FunctionContext {
        FunctionContext::new(self.manager.clone())
    }
}
