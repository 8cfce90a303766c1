//! Turn engine: command lifecycle, priority drain and the day loop.
//!
//! [`TurnEngine`] borrows a [`World`] for the duration of one turn together
//! with the [`TurnEnv`] collaborators. It is single-threaded and cooperative:
//! a dispatched routine runs to completion before the next actor is looked at,
//! and multi-day work lives only in the command's wait counter.
mod errors;
mod lifecycle;
mod report;
mod scheduler;
mod turns;

pub use errors::TurnError;
pub use report::{CommandEvent, CommandEventKind, TurnReport};
pub use scheduler::{Scheduler, Slot};

use crate::command::{CommandContext, Routine};
use crate::env::TurnEnv;
use crate::state::{EntityId, World};

pub struct TurnEngine<'a> {
    world: &'a mut World,
    env: TurnEnv<'a>,
    report: TurnReport,
}

impl<'a> TurnEngine<'a> {
    pub fn new(world: &'a mut World, env: TurnEnv<'a>) -> Self {
        let report = TurnReport::new(world.calendar.turn);
        Self { world, env, report }
    }

    pub fn world(&self) -> &World {
        self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        self.world
    }

    pub fn env(&self) -> TurnEnv<'a> {
        self.env
    }

    /// Events recorded so far this turn.
    pub fn report(&self) -> &TurnReport {
        &self.report
    }

    fn record(&mut self, actor: Option<EntityId>, kind: CommandEventKind) {
        let day = self.world.calendar.day;
        self.report.push(day, actor, kind);
    }

    fn run_routine(&mut self, actor: EntityId, routine: Routine) -> bool {
        let mut context = CommandContext::new(self.world, actor);
        routine(&mut context)
    }
}
