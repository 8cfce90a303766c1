//! Handler-table contract consumed by the scheduler.

use super::{ActionCode, Command, Operand, Outcome, Priority};
use crate::state::{EntityId, World};

/// Start, finish and interrupt callbacks share this shape: actor context in,
/// success out.
pub type Routine = fn(&mut CommandContext<'_>) -> bool;

/// Scheduling metadata and callbacks for one action code.
#[derive(Clone, Copy, Debug)]
pub struct ActionSpec {
    pub code: ActionCode,
    pub verb: &'static str,
    /// Called once when the command is selected.
    pub start: Option<Routine>,
    /// Called on each due day step.
    pub finish: Option<Routine>,
    /// Called when a running command is cancelled from outside.
    pub interrupt: Option<Routine>,
    /// Nominal duration in days, copied into `wait` when the order is loaded.
    pub duration: i32,
    pub poll: bool,
    pub priority: Priority,
}

/// Lookup from action code to its metadata.
pub trait HandlerTable: Send + Sync {
    fn spec(&self, code: ActionCode) -> Option<&ActionSpec>;
}

/// Context handed to a routine.
///
/// Routines get the whole world so they can move stacks, file orders for
/// other actors and request follow-up loads, but the record they belong to is
/// always reachable through [`CommandContext::command`].
pub struct CommandContext<'w> {
    world: &'w mut World,
    actor: EntityId,
}

impl<'w> CommandContext<'w> {
    pub fn new(world: &'w mut World, actor: EntityId) -> Self {
        Self { world, actor }
    }

    #[inline]
    pub fn actor(&self) -> EntityId {
        self.actor
    }

    pub fn world(&self) -> &World {
        self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        self.world
    }

    pub fn command(&self) -> Option<&Command> {
        self.world.command(self.actor)
    }

    pub fn command_mut(&mut self) -> Option<&mut Command> {
        self.world.command_mut(self.actor)
    }

    pub fn operands(&self) -> &[Operand] {
        self.command().map(|c| c.operands.as_slice()).unwrap_or(&[])
    }

    pub fn entity_operand(&self, index: usize) -> Option<EntityId> {
        self.command()?.entity_operand(index)
    }

    pub fn number_operand(&self, index: usize) -> Option<i64> {
        self.command()?.number_operand(index)
    }

    /// Sets the remaining wait; a positive value keeps the command alive.
    pub fn set_wait(&mut self, days: i32) {
        if let Some(command) = self.command_mut() {
            command.wait = days;
        }
    }

    /// Marks the command failed; it completes at the next check.
    pub fn fail(&mut self) {
        if let Some(command) = self.command_mut() {
            command.outcome = Outcome::Failure;
        }
    }

    /// Suppresses the finish routine when the command completes.
    pub fn inhibit_finish(&mut self) {
        if let Some(command) = self.command_mut() {
            command.inhibit_finish = true;
        }
    }

    pub fn current_day(&self) -> u32 {
        self.world.calendar.day
    }
}
