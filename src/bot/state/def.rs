use std::{collections::HashSet, io, path::PathBuf, sync::Arc};
use thiserror::Error;

use crate::bot::{functions::FunctionRegistry, registry::manager::ApplicationCommandManager};

pub type BotResult<T> = Result<T, BotError>;

pub struct AppState {
    pub config: Arc<BotConfig>,
    pub manager: Arc<ApplicationCommandManager>,
    pub functions: Arc<FunctionRegistry>,
}

#[derive(Clone)]
pub struct BotConfig {
    pub discord_token: String,
    //Where command files live, relative to base_dir unless absolute
    pub commands_dir: PathBuf,
    pub base_dir: PathBuf,
    pub prefix: String,
    //Empty means global
    pub sync_guilds: Vec<String>,
    pub sync_on_ready: bool,
    pub owner_ids: HashSet<u64>,
}

#[derive(Debug, Error)]
pub enum BotError {
    #[error("Invalid slash command specification in: {path} ({reason})")]
    InvalidCommandSpecification { path: PathBuf, reason: String },
    #[error("Invalid guild ID provided: {0}")]
    InvalidScope(String),
    #[error("No command registrar is attached yet")]
    RegistrarUnavailable,
    #[error("Nothing has been loaded yet")]
    NothingLoaded,
    #[error("I/O error at {path}: {source}")]
    Fs { path: PathBuf, #[source] source: io::Error },
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
    #[error("Discord error: {0}")]
    Serenity(#[from] serenity::Error),
    #[error("Configuration error: {0}")]
    Config(String),
}

impl BotError {
    pub fn fs(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> BotError {
        let path = path.into();
        move |source| BotError::Fs { path, source }
    }
}
