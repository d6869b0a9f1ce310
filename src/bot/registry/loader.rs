use std::path::{Path, PathBuf};

use futures::future::BoxFuture;
use tokio::fs;
use tracing::debug;

use crate::bot::{registry::{definition::parse_command_file, store::CommandStore}, state::def::{BotError, BotResult}};

pub const COMMAND_FILE_EXTENSION: &str = "json";

/// Walks `root` depth-first and inserts every command found into `store`.
///
/// Entries are visited in file-name order, so when two files define the same
/// command the one visited last wins. Returns how many definitions were read,
/// counting overwritten ones.
pub async fn load_directory(root: &Path, store: &mut CommandStore) -> BotResult<usize> {
    walk(root.to_path_buf(), store).await
}

fn walk(dir: PathBuf, store: &mut CommandStore) -> BoxFuture<'_, BotResult<usize>> {
    Box::pin(async move {
        let mut read_dir = fs::read_dir(&dir).await.map_err(BotError::fs(&dir))?;
        let mut entries = Vec::new();
        while let Some(entry) = read_dir.next_entry().await.map_err(BotError::fs(&dir))? {
            entries.push(entry);
        }
        entries.sort_by_key(|entry| entry.file_name());

        let mut found = 0;
        for entry in entries {
            let path = entry.path();
            let file_type = entry.file_type().await.map_err(BotError::fs(&path))?;

            if file_type.is_dir() {
                found += walk(path, store).await?;
                continue;
            } else if !is_command_file(&path) {
                debug!("Skipping {}", path.display());
                continue;
            }

            let raw = fs::read_to_string(&path).await.map_err(BotError::fs(&path))?;
            let definitions = parse_command_file(&path, &raw)?;
            debug!("Read {} command(s) from {}", definitions.len(), path.display());

            found += definitions.len();
            for definition in definitions {
                store.insert(definition);
            }
        }

        Ok(found)
    })
}

fn is_command_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == COMMAND_FILE_EXTENSION)
}
