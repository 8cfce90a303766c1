//! Collaborators the turn engine consults but does not own.
//!
//! The engine sees order parsing, action handlers and turn-level hooks only
//! through the traits re-exported here, bundled into a [`TurnEnv`].
mod rng;

pub use rng::{PcgRng, RngOracle, compute_seed};

use crate::command::{HandlerTable, OrderParser, ParseError};
use crate::engine::{TurnEngine, TurnError};
use crate::state::{EntityId, World};

/// Extension points called at fixed places in the turn.
///
/// Every method has a no-op default so implementors override only what they
/// need. Hooks receive the running engine and may load, interrupt or
/// force-stop commands through it.
pub trait TurnHooks: Send + Sync {
    /// Repairs stacking and location invariants before anything is scheduled.
    fn check_consistency(&self, _engine: &mut TurnEngine<'_>) -> Result<(), TurnError> {
        Ok(())
    }

    /// Files orders for system-controlled actors.
    fn inject_standing_orders(&self, _engine: &mut TurnEngine<'_>) -> Result<(), TurnError> {
        Ok(())
    }

    fn notify_watchers(&self, _engine: &mut TurnEngine<'_>) -> Result<(), TurnError> {
        Ok(())
    }

    /// Reloads actors whose command was interrupted at the end of last turn.
    fn requeue_interrupted(&self, _engine: &mut TurnEngine<'_>) -> Result<(), TurnError> {
        Ok(())
    }

    fn player_standing_orders(&self, _engine: &mut TurnEngine<'_>) -> Result<(), TurnError> {
        Ok(())
    }

    /// Runs once, on day 1, before the first drain.
    fn match_trades(&self, _engine: &mut TurnEngine<'_>) -> Result<(), TurnError> {
        Ok(())
    }

    /// Automatic engagement check, fired at most once per day.
    fn check_engagements(&self, _engine: &mut TurnEngine<'_>) -> Result<(), TurnError> {
        Ok(())
    }

    /// Told about every order that failed to parse.
    fn report_failure(&self, _world: &World, _actor: EntityId, _text: &str, _error: &ParseError) {}
}

/// Hooks that do nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoHooks;

impl TurnHooks for NoHooks {}

/// Read-only collaborators for one turn.
#[derive(Clone, Copy)]
pub struct TurnEnv<'a> {
    pub parser: &'a dyn OrderParser,
    pub handlers: &'a dyn HandlerTable,
    pub hooks: &'a dyn TurnHooks,
}

impl<'a> TurnEnv<'a> {
    pub fn new(
        parser: &'a dyn OrderParser,
        handlers: &'a dyn HandlerTable,
        hooks: &'a dyn TurnHooks,
    ) -> Self {
        Self {
            parser,
            handlers,
            hooks,
        }
    }

    /// Environment without hooks.
    pub fn without_hooks(parser: &'a dyn OrderParser, handlers: &'a dyn HandlerTable) -> Self {
        Self::new(parser, handlers, &NoHooks)
    }
}
