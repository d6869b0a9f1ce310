use std::{collections::HashMap, path::{Path, PathBuf}, sync::Arc};

use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::bot::{registry::{definition::CommandDefinition, loader::load_directory, store::CommandStore, sync::{sync_commands, CommandRegistrar, SyncReport}}, state::def::{BotError, BotResult}};

/// What the last top-level `load` was asked for, replayed by `reload`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadState {
    pub dir: PathBuf,
    pub resolved: PathBuf,
}

/// The store plus the resolved directory that last wrote each name.
#[derive(Default)]
struct CommandCache {
    store: CommandStore,
    origins: HashMap<String, PathBuf>,
}

impl CommandCache {
    fn absorb(&mut self, staged: CommandStore, origin: &Path) {
        for name in staged.names() {
            self.origins.insert(name.to_string(), origin.to_path_buf());
        }
        self.store.merge(staged);
    }

    /// Drops the names `origin` owned that it no longer defines.
    fn retire(&mut self, staged: &CommandStore, origin: &Path) -> usize {
        let stale: Vec<String> = self
            .origins
            .iter()
            .filter(|(name, from)| from.as_path() == origin && !staged.contains(name))
            .map(|(name, _)| name.clone())
            .collect();
        for name in &stale {
            self.origins.remove(name);
            self.store.remove(name);
        }
        stale.len()
    }
}

pub struct ApplicationCommandManager {
    base_dir: PathBuf,
    commands: RwLock<CommandCache>,
    load_state: RwLock<Option<LoadState>>,
    registrar: RwLock<Option<Arc<dyn CommandRegistrar>>>,
    // Held for the whole of load and reload
    load_lock: Mutex<()>,
}

impl ApplicationCommandManager {
    /// Relative directories given to `load` are resolved against `base_dir`.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            commands: RwLock::new(CommandCache::default()),
            load_state: RwLock::new(None),
            registrar: RwLock::new(None),
            load_lock: Mutex::new(()),
        }
    }

    pub async fn attach_registrar(&self, registrar: Arc<dyn CommandRegistrar>) {
        *self.registrar.write().await = Some(registrar);
    }

    pub async fn clear_commands(&self) -> &Self {
        let mut commands = self.commands.write().await;
        commands.store.clear();
        commands.origins.clear();
        drop(commands);
        self
    }

    pub async fn command_size(&self) -> usize {
        self.commands.read().await.store.len()
    }

    pub async fn get_commands(&self) -> Vec<CommandDefinition> {
        self.commands.read().await.store.values()
    }

    pub async fn load_state(&self) -> Option<LoadState> {
        self.load_state.read().await.clone()
    }

    pub fn resolve(&self, dir: &Path) -> PathBuf {
        self.base_dir.join(dir)
    }

    /// Loads every command under `dir` on top of what is already cached.
    ///
    /// Same-named commands are overwritten, nothing is removed. The walk is
    /// staged: if any file fails, the cache is left as it was. The directory is
    /// remembered for `reload` even when the walk fails.
    pub async fn load(&self, dir: impl AsRef<Path>) -> BotResult<usize> {
        let _guard = self.load_lock.lock().await;
        let dir = dir.as_ref();
        let resolved = self.resolve(dir);
        *self.load_state.write().await = Some(LoadState { dir: dir.to_path_buf(), resolved: resolved.clone() });

        let mut staged = CommandStore::new();
        let found = load_directory(&resolved, &mut staged).await?;

        let mut commands = self.commands.write().await;
        commands.absorb(staged, &resolved);
        info!("Loaded {} command definition(s) from {}, {} cached", found, resolved.display(), commands.store.len());
        debug!("Cached commands: {}", commands.store.names().collect::<Vec<_>>().join(", "));

        Ok(found)
    }

    /// Replays the last `load`. Only the commands that directory contributed
    /// are replaced, so deleted files disappear and commands loaded from other
    /// directories stay. A failed reload keeps the old cache.
    pub async fn reload(&self) -> BotResult<usize> {
        let _guard = self.load_lock.lock().await;
        let state = self.load_state().await.ok_or(BotError::NothingLoaded)?;

        let mut staged = CommandStore::new();
        let found = load_directory(&state.resolved, &mut staged).await?;

        if staged.is_empty() {
            warn!("Reload of {} found no commands", state.dir.display());
        }
        let count = staged.len();
        let mut commands = self.commands.write().await;
        let dropped = commands.retire(&staged, &state.resolved);
        commands.absorb(staged, &state.resolved);
        info!(
            "Reloaded {} command(s) from {}, dropped {}, {} cached",
            count,
            state.resolved.display(),
            dropped,
            commands.store.len()
        );

        Ok(found)
    }

    /// Pushes a snapshot of the cache to the given guilds, or globally.
    pub async fn sync(&self, target_ids: Option<&[String]>) -> BotResult<SyncReport> {
        let snapshot = self.get_commands().await;
        let registrar = self.registrar.read().await.clone();
        sync_commands(registrar.as_deref(), &snapshot, target_ids).await
    }
}

#[cfg(test)]
mod tests {
    use std::{fs, time::Duration};

    use super::*;
    use crate::bot::registry::{loader::tests::{command, write}, sync::testing::RecordingRegistrar};

    async fn manager_with(registrar: Arc<RecordingRegistrar>, base: &Path) -> ApplicationCommandManager {
        let manager = ApplicationCommandManager::new(base);
        manager.attach_registrar(registrar).await;
        manager
    }

    #[tokio::test]
    async fn load_resolves_against_the_base_dir() {
        let base = tempfile::tempdir().unwrap();
        write(base.path(), "cmds/ping.json", &command("ping", "pong"));
        write(base.path(), "cmds/admin/ban.json", &command("ban", "bans"));

        let manager = ApplicationCommandManager::new(base.path());
        assert_eq!(manager.load("cmds").await.unwrap(), 2);

        assert_eq!(manager.command_size().await, 2);
        assert_eq!(
            manager.load_state().await,
            Some(LoadState { dir: PathBuf::from("cmds"), resolved: base.path().join("cmds") })
        );
    }

    #[tokio::test]
    async fn absolute_dirs_are_used_verbatim() {
        let base = tempfile::tempdir().unwrap();
        let elsewhere = tempfile::tempdir().unwrap();
        write(elsewhere.path(), "ping.json", &command("ping", "pong"));

        let manager = ApplicationCommandManager::new(base.path());
        manager.load(elsewhere.path()).await.unwrap();

        assert_eq!(manager.command_size().await, 1);
        assert_eq!(manager.load_state().await.unwrap().resolved, elsewhere.path());
    }

    #[tokio::test]
    async fn clear_then_query() {
        let base = tempfile::tempdir().unwrap();
        write(base.path(), "cmds/ping.json", &command("ping", "pong"));
        let manager = ApplicationCommandManager::new(base.path());
        manager.load("cmds").await.unwrap();

        assert_eq!(manager.clear_commands().await.command_size().await, 0);
        assert!(manager.get_commands().await.is_empty());
    }

    #[tokio::test]
    async fn repeated_load_overwrites_but_keeps_others() {
        let base = tempfile::tempdir().unwrap();
        write(base.path(), "one/ping.json", &command("ping", "v1"));
        write(base.path(), "one/help.json", &command("help", "help"));
        write(base.path(), "two/ping.json", &command("ping", "v2"));

        let manager = ApplicationCommandManager::new(base.path());
        manager.load("one").await.unwrap();
        manager.load("two").await.unwrap();

        let commands = manager.get_commands().await;
        assert_eq!(commands.len(), 2);
        let ping = commands.iter().find(|c| c.name == "ping").unwrap();
        assert_eq!(ping.description(), Some("v2"));
    }

    #[tokio::test]
    async fn failed_load_leaves_cache_untouched() {
        let base = tempfile::tempdir().unwrap();
        write(base.path(), "good/ping.json", &command("ping", "pong"));
        write(base.path(), "bad/a.json", &command("stats", "stats"));
        write(base.path(), "bad/b.json", "[{}]");

        let manager = ApplicationCommandManager::new(base.path());
        manager.load("good").await.unwrap();
        let before = manager.get_commands().await;

        let err = manager.load("bad").await.unwrap_err();
        assert!(matches!(err, BotError::InvalidCommandSpecification { .. }));
        assert_eq!(manager.get_commands().await, before);
        assert_eq!(manager.load_state().await.unwrap().dir, PathBuf::from("bad"));
    }

    #[tokio::test]
    async fn reload_matches_a_fresh_load() {
        let base = tempfile::tempdir().unwrap();
        write(base.path(), "cmds/ping.json", &command("ping", "pong"));
        write(base.path(), "cmds/sub/deep/help.json", &command("help", "help"));

        let manager = ApplicationCommandManager::new(base.path());
        manager.load("cmds").await.unwrap();
        write(base.path(), "cmds/sub/new.json", &command("new", "added later"));
        manager.reload().await.unwrap();

        let fresh = ApplicationCommandManager::new(base.path());
        fresh.load("cmds").await.unwrap();

        assert_eq!(manager.get_commands().await, fresh.get_commands().await);
        assert_eq!(manager.command_size().await, 3);
        // The top-level directory is what gets replayed, not the last subdirectory visited
        assert_eq!(manager.load_state().await.unwrap().dir, PathBuf::from("cmds"));
    }

    #[tokio::test]
    async fn reload_drops_deleted_commands() {
        let base = tempfile::tempdir().unwrap();
        write(base.path(), "cmds/ping.json", &command("ping", "pong"));
        write(base.path(), "cmds/gone.json", &command("gone", "bye"));

        let manager = ApplicationCommandManager::new(base.path());
        manager.load("cmds").await.unwrap();
        fs::remove_file(base.path().join("cmds/gone.json")).unwrap();
        manager.reload().await.unwrap();

        let names: Vec<_> = manager.get_commands().await.into_iter().map(|c| c.name).collect();
        assert_eq!(names, ["ping"]);
    }

    #[tokio::test]
    async fn reload_keeps_commands_from_other_directories() {
        let base = tempfile::tempdir().unwrap();
        write(base.path(), "one/ping.json", &command("ping", "pong"));
        write(base.path(), "two/help.json", &command("help", "help"));
        write(base.path(), "two/old.json", &command("old", "stale"));

        let manager = ApplicationCommandManager::new(base.path());
        manager.load("one").await.unwrap();
        manager.load("two").await.unwrap();
        fs::remove_file(base.path().join("two/old.json")).unwrap();
        manager.reload().await.unwrap();

        let names: Vec<_> = manager.get_commands().await.into_iter().map(|c| c.name).collect();
        assert_eq!(names, ["ping", "help"]);
    }

    #[tokio::test]
    async fn reload_removes_names_the_directory_last_wrote() {
        let base = tempfile::tempdir().unwrap();
        write(base.path(), "one/ping.json", &command("ping", "v1"));
        write(base.path(), "two/ping.json", &command("ping", "v2"));
        write(base.path(), "two/help.json", &command("help", "help"));

        let manager = ApplicationCommandManager::new(base.path());
        manager.load("two").await.unwrap();
        manager.load("one").await.unwrap();
        fs::remove_file(base.path().join("one/ping.json")).unwrap();
        write(base.path(), "one/stats.json", &command("stats", "stats"));
        manager.reload().await.unwrap();

        // "one" last wrote ping, so removing its file removes ping
        let names: Vec<_> = manager.get_commands().await.into_iter().map(|c| c.name).collect();
        assert_eq!(names, ["help", "stats"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_load_and_reload_lose_nothing() {
        let base = tempfile::tempdir().unwrap();
        write(base.path(), "one/ping.json", &command("ping", "pong"));
        for i in 0..20 {
            write(base.path(), &format!("two/cmd{i:02}.json"), &command(&format!("cmd{i:02}"), "bulk"));
        }

        let manager = Arc::new(ApplicationCommandManager::new(base.path()));
        manager.load("one").await.unwrap();

        let loader = {
            let manager = manager.clone();
            tokio::spawn(async move { manager.load("two").await })
        };
        let reloader = {
            let manager = manager.clone();
            tokio::spawn(async move { manager.reload().await })
        };
        loader.await.unwrap().unwrap();
        reloader.await.unwrap().unwrap();

        assert_eq!(manager.command_size().await, 21);
    }

    #[tokio::test]
    async fn reload_waits_for_a_running_load() {
        let base = tempfile::tempdir().unwrap();
        write(base.path(), "cmds/ping.json", &command("ping", "pong"));
        let manager = Arc::new(ApplicationCommandManager::new(base.path()));
        manager.load("cmds").await.unwrap();

        let guard = manager.load_lock.lock().await;
        let mut reloader = {
            let manager = manager.clone();
            tokio::spawn(async move { manager.reload().await })
        };
        assert!(tokio::time::timeout(Duration::from_millis(50), &mut reloader).await.is_err());

        drop(guard);
        assert_eq!(reloader.await.unwrap().unwrap(), 1);
    }

    #[tokio::test]
    async fn clear_forgets_where_commands_came_from() {
        let base = tempfile::tempdir().unwrap();
        write(base.path(), "cmds/ping.json", &command("ping", "pong"));

        let manager = ApplicationCommandManager::new(base.path());
        manager.load("cmds").await.unwrap();
        manager.clear_commands().await;
        manager.reload().await.unwrap();

        assert_eq!(manager.command_size().await, 1);
    }

    #[tokio::test]
    async fn reload_before_load_fails() {
        let manager = ApplicationCommandManager::new("/");
        assert!(matches!(manager.reload().await, Err(BotError::NothingLoaded)));
    }

    #[tokio::test]
    async fn sync_payload_is_the_current_snapshot() {
        let base = tempfile::tempdir().unwrap();
        write(base.path(), "cmds/a.json", &command("a", "first"));
        write(base.path(), "cmds/b.json", &format!("[{}, {}]", command("b", "second"), command("c", "third")));

        let registrar = Arc::new(RecordingRegistrar::ready(&[5]));
        let manager = manager_with(registrar.clone(), base.path()).await;
        manager.load("cmds").await.unwrap();
        let snapshot = manager.get_commands().await;

        manager.sync(None).await.unwrap();
        manager.sync(Some(&["5".to_string()])).await.unwrap();

        assert_eq!(registrar.global_calls(), vec![snapshot.clone()]);
        assert_eq!(registrar.guild_calls(), vec![(serenity::all::GuildId::new(5), snapshot)]);
    }
}
