use core::fmt;

use futures::future::join_all;
use serenity::{all::GuildId, async_trait};
use tracing::{info, warn};

use crate::bot::{registry::definition::CommandDefinition, state::def::{BotError, BotResult}};

/// The REST side of a sync: every call replaces the whole registered set.
#[async_trait]
pub trait CommandRegistrar: Send + Sync {
    /// Succeeds when the guild is reachable, checking the local cache before
    /// asking the API. Fails with `InvalidScope` otherwise.
    async fn resolve_guild(&self, guild_id: GuildId) -> BotResult<()>;

    async fn set_guild_commands(&self, guild_id: GuildId, commands: &[CommandDefinition]) -> BotResult<usize>;

    /// `Ok(None)` while the application is not ready to take commands.
    async fn set_global_commands(&self, commands: &[CommandDefinition]) -> BotResult<Option<usize>>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncScope {
    Global,
    Guild(String),
}

impl fmt::Display for SyncScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncScope::Global => write!(f, "global"),
            SyncScope::Guild(id) => write!(f, "guild {}", id),
        }
    }
}

#[derive(Debug)]
pub enum SyncOutcome {
    Registered(usize),
    Skipped,
    Failed(BotError),
}

#[derive(Debug)]
pub struct ScopeReport {
    pub scope: SyncScope,
    pub outcome: SyncOutcome,
}

#[derive(Debug, Default)]
pub struct SyncReport {
    pub scopes: Vec<ScopeReport>,
}

impl SyncReport {
    pub fn is_success(&self) -> bool {
        self.failures().next().is_none()
    }

    pub fn registered(&self) -> usize {
        self.scopes.iter().filter(|s| matches!(s.outcome, SyncOutcome::Registered(_))).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = (&SyncScope, &BotError)> {
        self.scopes.iter().filter_map(|s| match &s.outcome {
            SyncOutcome::Failed(e) => Some((&s.scope, e)),
            _ => None,
        })
    }
}

pub fn parse_guild_id(raw: &str) -> BotResult<GuildId> {
    match raw.trim().parse::<u64>() {
        Ok(id) if id != 0 => Ok(GuildId::new(id)),
        _ => Err(BotError::InvalidScope(raw.to_string())),
    }
}

/// Replaces the registered command set with `commands`.
///
/// With no (or no non-empty) `target_ids` this is one global overwrite whose
/// error is returned as-is. Otherwise every guild is handled concurrently and
/// awaited; a guild that fails is recorded in the report and does not stop the
/// others.
pub async fn sync_commands(registrar: Option<&dyn CommandRegistrar>, commands: &[CommandDefinition], target_ids: Option<&[String]>) -> BotResult<SyncReport> {
    let target_ids = target_ids.filter(|ids| !ids.is_empty());

    let Some(target_ids) = target_ids else {
        let outcome = match registrar {
            Some(registrar) => match registrar.set_global_commands(commands).await? {
                Some(count) => {
                    info!("Registered {} global commands", count);
                    SyncOutcome::Registered(count)
                }
                None => {
                    info!("Application is not ready, skipping global sync");
                    SyncOutcome::Skipped
                }
            },
            None => {
                info!("No registrar attached yet, skipping global sync");
                SyncOutcome::Skipped
            }
        };
        return Ok(SyncReport { scopes: vec![ScopeReport { scope: SyncScope::Global, outcome }] });
    };

    let tasks = target_ids.iter().map(|raw| async move {
        let outcome = match sync_guild(registrar, raw, commands).await {
            Ok(count) => {
                info!("Registered {} commands in guild {}", count, raw);
                SyncOutcome::Registered(count)
            }
            Err(e) => {
                warn!("Failed to sync guild {}: {}", raw, e);
                SyncOutcome::Failed(e)
            }
        };
        ScopeReport { scope: SyncScope::Guild(raw.clone()), outcome }
    });

    Ok(SyncReport { scopes: join_all(tasks).await })
}

async fn sync_guild(registrar: Option<&dyn CommandRegistrar>, raw: &str, commands: &[CommandDefinition]) -> BotResult<usize> {
    let guild_id = parse_guild_id(raw)?;
    let registrar = registrar.ok_or(BotError::RegistrarUnavailable)?;
    registrar.resolve_guild(guild_id).await?;
    registrar.set_guild_commands(guild_id, commands).await
}
