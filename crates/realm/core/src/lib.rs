//! Deterministic command scheduling for a turn-based world.
//!
//! `realm-core` owns the world state (entity store, stacking, order book) and
//! the engine that runs one turn of it: commands are loaded from order text,
//! selected tier by tier with preemption, and stepped day by day. All state
//! mutation during a turn flows through [`engine::TurnEngine`]. The crate
//! performs no I/O; parsers, handlers and hooks are supplied by callers
//! through [`env::TurnEnv`].
pub mod command;
pub mod config;
pub mod engine;
pub mod env;
pub mod error;
pub mod orders;
mod stack;
pub mod state;
pub mod store;
pub use command::{
    ActionCode, ActionSpec, Command, CommandContext, CommandState, HandlerTable, Operand,
    Operands, OrderParser, Outcome, ParseError, ParsedOrder, Priority, Routine,
};
pub use config::{IdRange, RangeRule, RealmConfig};
pub use engine::{
    CommandEvent, CommandEventKind, Scheduler, Slot, TurnEngine, TurnError, TurnReport,
};
pub use env::{NoHooks, PcgRng, RngOracle, TurnEnv, TurnHooks, compute_seed};
pub use error::{ErrorSeverity, RealmError};
pub use orders::{OrderBook, OrderError};
#[cfg(feature = "serde")]
pub use state::PersistError;
pub use state::{Calendar, EntityId, Kind, Subkind, World};
pub use store::{ChainIter, Entity, EntityFlags, EntityStore, Location};
