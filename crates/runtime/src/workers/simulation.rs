//! Simulation worker that owns the authoritative [`realm_core::World`].
//!
//! Receives commands from [`RuntimeHandle`](crate::RuntimeHandle), runs turns
//! through [`realm_core::TurnEngine`] and publishes events to the EventBus.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

use realm_content::{ActionTable, TextOrderParser};
use realm_core::{EntityId, OrderError, RealmError, TurnEngine, TurnEnv, TurnReport, World};

use crate::api::{Result, RuntimeError};
use crate::events::{CommandNotice, Event, EventBus, TurnEvent};
use crate::hooks::HookRegistry;
use crate::repository::WorldRepository;

/// Commands that can be sent to the simulation worker
pub enum Command {
    /// Process the next turn.
    RunTurn {
        reply: oneshot::Sender<Result<TurnReport>>,
    },
    /// Append orders to an actor's queue.
    SubmitOrders {
        actor: EntityId,
        orders: Vec<String>,
        reply: oneshot::Sender<Result<usize>>,
    },
    /// Query the current world (read-only).
    QueryWorld { reply: oneshot::Sender<World> },
    /// Persist the current world.
    Save { reply: oneshot::Sender<Result<u32>> },
}

/// Background task that processes turn commands.
///
/// Each turn runs against a working copy of the world. The copy replaces the
/// authoritative world only when the turn completes, so an aborted turn
/// leaves no trace.
pub struct SimulationWorker {
    world: World,
    table: ActionTable,
    parser: TextOrderParser,
    hooks: HookRegistry,
    command_rx: mpsc::Receiver<Command>,
    event_bus: EventBus,
    repository: Option<Arc<dyn WorldRepository>>,
    autosave: bool,
}

impl SimulationWorker {
    pub fn new(
        world: World,
        table: ActionTable,
        hooks: HookRegistry,
        command_rx: mpsc::Receiver<Command>,
        event_bus: EventBus,
    ) -> Self {
        info!(
            turn = world.calendar.turn,
            entities = world.entities.len(),
            pending_orders = world.orders.total(),
            hooks = hooks.len(),
            "SimulationWorker initialized"
        );

        let parser = TextOrderParser::new(&table);
        Self {
            world,
            table,
            parser,
            hooks,
            command_rx,
            event_bus,
            repository: None,
            autosave: false,
        }
    }

    /// Attaches a repository; with `autosave` every completed turn is saved.
    pub fn with_repository(mut self, repository: Arc<dyn WorldRepository>, autosave: bool) -> Self {
        self.repository = Some(repository);
        self.autosave = autosave;
        self
    }

    /// Main worker loop.
    pub async fn run(mut self) {
        loop {
            tokio::select! {
                Some(cmd) = self.command_rx.recv() => {
                    self.handle_command(cmd);
                }
                else => break,
            }
        }
        debug!("SimulationWorker stopped");
    }

    fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::RunTurn { reply } => {
                let result = self.handle_run_turn();
                if reply.send(result).is_err() {
                    debug!("RunTurn reply channel closed (caller dropped)");
                }
            }
            Command::SubmitOrders {
                actor,
                orders,
                reply,
            } => {
                let result = self.handle_submit_orders(actor, orders);
                if reply.send(result).is_err() {
                    debug!("SubmitOrders reply channel closed (caller dropped)");
                }
            }
            Command::QueryWorld { reply } => {
                if reply.send(self.world.clone()).is_err() {
                    debug!("QueryWorld reply channel closed (caller dropped)");
                }
            }
            Command::Save { reply } => {
                let result = self.handle_save();
                if reply.send(result).is_err() {
                    debug!("Save reply channel closed (caller dropped)");
                }
            }
        }
    }

    fn handle_run_turn(&mut self) -> Result<TurnReport> {
        let turn = self.world.calendar.turn + 1;
        self.event_bus
            .publish(Event::Turn(TurnEvent::Started { turn }));

        let mut working = self.world.clone();
        let env = TurnEnv::new(&self.parser, &self.table, &self.hooks);
        let report = match TurnEngine::new(&mut working, env).process_orders(turn) {
            Ok(report) => report,
            Err(source) => {
                error!(
                    turn,
                    code = source.error_code(),
                    severity = source.severity().as_str(),
                    error = %source,
                    "Turn aborted, world left unchanged"
                );
                self.event_bus.publish(Event::Turn(TurnEvent::Failed {
                    turn,
                    error: source.to_string(),
                }));
                return Err(RuntimeError::Turn { turn, source });
            }
        };
        self.world = working;

        for event in &report.events {
            self.event_bus.publish(Event::Command(CommandNotice {
                turn,
                event: event.clone(),
            }));
        }

        let digest = match self.world.digest() {
            Ok(bytes) => Some(hex::encode(bytes)),
            Err(e) => {
                warn!(turn, error = %e, "Failed to digest world");
                None
            }
        };
        info!(
            turn,
            events = report.events.len(),
            completions = report.completions(),
            digest = digest.as_deref().unwrap_or("-"),
            "Turn completed"
        );
        self.event_bus.publish(Event::Turn(TurnEvent::Completed {
            turn,
            completions: report.completions(),
            digest,
        }));

        if self.autosave {
            // A failed autosave does not undo the turn.
            if let Err(e) = self.handle_save() {
                warn!(turn, error = %e, "Autosave failed");
            }
        }

        Ok(report)
    }

    fn handle_submit_orders(&mut self, actor: EntityId, orders: Vec<String>) -> Result<usize> {
        let count = orders.len();
        let mut working = self.world.orders.clone();
        let owner = self
            .world
            .owner_of(actor)
            .map_err(|_| OrderError::UnknownActor { actor })?;
        for text in orders {
            working.push(owner, actor, text)?;
        }
        self.world.orders = working;

        debug!(%actor, %owner, count, "Orders submitted");
        Ok(count)
    }

    fn handle_save(&mut self) -> Result<u32> {
        let repository = self.repository.as_ref().ok_or(RuntimeError::NoRepository)?;
        let turn = self.world.calendar.turn;

        match repository.save(turn, &self.world) {
            Ok(()) => {
                debug!(turn, "World saved");
                self.event_bus.publish(Event::Turn(TurnEvent::Saved { turn }));
                Ok(turn)
            }
            Err(e) => {
                self.event_bus.publish(Event::Turn(TurnEvent::SaveFailed {
                    turn,
                    error: e.to_string(),
                }));
                Err(e.into())
            }
        }
    }
}
