//! High-level runtime orchestrator.
//!
//! The runtime owns the simulation worker, wires up command/event channels,
//! and exposes a builder-based API for clients to drive turns.

use std::path::PathBuf;
use std::sync::Arc;

use directories::ProjectDirs;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::warn;

use realm_content::ActionTable;
use realm_core::{TurnReport, World};

use crate::api::{Result, RuntimeError, RuntimeHandle};
use crate::events::{Event, EventBus, Topic};
use crate::hooks::HookRegistry;
use crate::repository::{FileWorldRepository, WorldRepository};
use crate::workers::{Command, SimulationWorker};

/// Runtime configuration shared across the orchestrator and workers.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub event_buffer_size: usize,
    pub command_buffer_size: usize,
    /// Save the world after every completed turn.
    pub autosave: bool,
    /// Where saves go when no repository is supplied.
    pub data_dir: Option<PathBuf>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            event_buffer_size: 100,
            command_buffer_size: 32,
            autosave: false,
            data_dir: None,
        }
    }
}

impl RuntimeConfig {
    pub const ENV_EVENT_BUFFER: &'static str = "REALM_EVENT_BUFFER";
    pub const ENV_COMMAND_BUFFER: &'static str = "REALM_COMMAND_BUFFER";
    pub const ENV_AUTOSAVE: &'static str = "REALM_AUTOSAVE";
    pub const ENV_DATA_DIR: &'static str = "REALM_DATA_DIR";

    /// Defaults overridden by `REALM_*` environment variables.
    ///
    /// Unparseable values are logged and ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(size) = env_parse(Self::ENV_EVENT_BUFFER) {
            config.event_buffer_size = size;
        }
        if let Some(size) = env_parse(Self::ENV_COMMAND_BUFFER) {
            config.command_buffer_size = size;
        }
        if let Some(autosave) = env_parse(Self::ENV_AUTOSAVE) {
            config.autosave = autosave;
        }
        config.data_dir = std::env::var_os(Self::ENV_DATA_DIR)
            .map(PathBuf::from)
            .or_else(default_data_dir);
        config
    }

    /// Directory holding saved worlds.
    pub fn save_dir(&self) -> Option<PathBuf> {
        self.data_dir.as_ref().map(|dir| dir.join("saves"))
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    let value = std::env::var(key).ok()?;
    match value.trim().parse() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            warn!(key, value, "Ignoring unparseable environment value");
            None
        }
    }
}

/// Platform data directory for realm (e.g. `~/.local/share/realm`).
pub fn default_data_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "realm").map(|dirs| dirs.data_dir().to_path_buf())
}

/// Main runtime that orchestrates turn processing
///
/// Runtime owns the worker; [`RuntimeHandle`] provides a cloneable façade
/// for clients.
pub struct Runtime {
    handle: RuntimeHandle,
    sim_worker_handle: JoinHandle<()>,
}

impl Runtime {
    /// Create a new runtime builder
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Get a cloneable handle to this runtime
    pub fn handle(&self) -> RuntimeHandle {
        self.handle.clone()
    }

    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.handle.subscribe(topic)
    }

    /// Processes `count` turns in a row, stopping at the first failure.
    pub async fn run_turns(&self, count: u32) -> Result<Vec<TurnReport>> {
        let mut reports = Vec::with_capacity(count as usize);
        for _ in 0..count {
            reports.push(self.handle.run_turn().await?);
        }
        Ok(reports)
    }

    /// Shutdown the runtime gracefully
    ///
    /// Waits for the worker to drain once every handle has been dropped.
    pub async fn shutdown(self) -> Result<()> {
        drop(self.handle);

        self.sim_worker_handle
            .await
            .map_err(RuntimeError::WorkerJoin)
    }
}

/// Builder for [`Runtime`] with flexible configuration.
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    world: Option<World>,
    actions: Option<ActionTable>,
    hooks: Option<HookRegistry>,
    repository: Option<Arc<dyn WorldRepository>>,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            world: None,
            actions: None,
            hooks: None,
            repository: None,
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Provide the world to start from (required)
    pub fn initial_world(mut self, world: World) -> Self {
        self.world = Some(world);
        self
    }

    /// Replace the built-in action table.
    pub fn actions(mut self, actions: ActionTable) -> Self {
        self.actions = Some(actions);
        self
    }

    /// Set custom turn hooks.
    ///
    /// If not provided, [`HookRegistry::default_hooks`] is used.
    ///
    /// # Example
    ///
    /// ```ignore
    /// use std::sync::Arc;
    ///
    /// let runtime = Runtime::builder()
    ///     .initial_world(world)
    ///     .hooks(HookRegistry::new(vec![
    ///         Arc::new(ConsistencyHook) as Arc<dyn TurnHook>,
    ///         Arc::new(StandingOrderHook::new("wait 1")) as Arc<dyn TurnHook>,
    ///     ]))
    ///     .build()
    ///     .await?;
    /// ```
    pub fn hooks(mut self, hooks: HookRegistry) -> Self {
        self.hooks = Some(hooks);
        self
    }

    pub fn repository(mut self, repository: Arc<dyn WorldRepository>) -> Self {
        self.repository = Some(repository);
        self
    }

    pub fn autosave(mut self, enable: bool) -> Self {
        self.config.autosave = enable;
        self
    }

    /// Build the runtime
    ///
    /// When autosave is on and no repository was given, worlds are saved
    /// under the configured data directory.
    pub async fn build(self) -> Result<Runtime> {
        let world = self.world.ok_or(RuntimeError::MissingWorld)?;

        let repository = match self.repository {
            Some(repository) => Some(repository),
            None if self.config.autosave => {
                let dir = self.config.save_dir().ok_or(RuntimeError::NoRepository)?;
                Some(Arc::new(FileWorldRepository::new(dir)?) as Arc<dyn WorldRepository>)
            }
            None => None,
        };

        let (command_tx, command_rx) =
            mpsc::channel::<Command>(self.config.command_buffer_size.max(1));
        let event_bus = EventBus::with_capacity(self.config.event_buffer_size);
        let handle = RuntimeHandle::new(command_tx, event_bus.clone());

        let mut sim_worker = SimulationWorker::new(
            world,
            self.actions.unwrap_or_else(ActionTable::builtin),
            self.hooks.unwrap_or_default(),
            command_rx,
            event_bus,
        );
        if let Some(repository) = repository {
            sim_worker = sim_worker.with_repository(repository, self.config.autosave);
        }

        let sim_worker_handle = tokio::spawn(async move {
            sim_worker.run().await;
        });

        Ok(Runtime {
            handle,
            sim_worker_handle,
        })
    }
}
