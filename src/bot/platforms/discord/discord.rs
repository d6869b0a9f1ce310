use std::sync::Arc;

use serenity::{all::{Cache, GuildId, Http}, async_trait, http::HttpError};
use tracing::warn;

use crate::bot::{registry::{definition::CommandDefinition, sync::CommandRegistrar}, state::def::{BotError, BotResult}};

/// Registers commands through serenity's HTTP client.
///
/// Both overwrite calls hit Discord's bulk overwrite endpoints, so the
/// registered set becomes exactly the payload.
pub struct SerenityRegistrar {
    http: Arc<Http>,
    cache: Arc<Cache>,
}

impl SerenityRegistrar {
    pub fn new(http: Arc<Http>, cache: Arc<Cache>) -> Self {
        Self { http, cache }
    }
}

/// Only "no such guild" and "not a member" mean the ID itself is bad.
fn guild_lookup_error(guild_id: GuildId, why: serenity::Error) -> BotError {
    let status = match &why {
        serenity::Error::Http(HttpError::UnsuccessfulRequest(response)) => Some(response.status_code.as_u16()),
        _ => None,
    };
    match status {
        Some(403 | 404) => BotError::InvalidScope(guild_id.to_string()),
        _ => BotError::Serenity(why),
    }
}

#[async_trait]
impl CommandRegistrar for SerenityRegistrar {
    async fn resolve_guild(&self, guild_id: GuildId) -> BotResult<()> {
        let cached = self.cache.guild(guild_id).is_some();
        if cached {
            return Ok(());
        }

        match self.http.get_guild(guild_id).await {
            Ok(_) => Ok(()),
            Err(why) => {
                warn!("Could not fetch guild {}: {why:?}", guild_id);
                Err(guild_lookup_error(guild_id, why))
            }
        }
    }

    async fn set_guild_commands(&self, guild_id: GuildId, commands: &[CommandDefinition]) -> BotResult<usize> {
        let registered = self.http.create_guild_commands(guild_id, &commands).await?;
        Ok(registered.len())
    }

    async fn set_global_commands(&self, commands: &[CommandDefinition]) -> BotResult<Option<usize>> {
        if self.http.application_id().is_none() {
            return Ok(None);
        }

        let registered = self.http.create_global_commands(&commands).await?;
        Ok(Some(registered.len()))
    }
}
