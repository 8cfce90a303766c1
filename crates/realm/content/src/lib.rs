//! Concrete collaborators for the realm turn engine.
//!
//! The engine in `realm-core` only knows order parsing and action handling
//! through traits. This crate supplies the built-in implementations:
//! - the action table with every built-in verb and its routines
//! - a whitespace order parser driven by the same table
//! - the start-of-turn stacking repair
//! - RON scenario and TOML config loaders (`loaders` feature)

pub mod actions;
pub mod parser;
pub mod repair;

#[cfg(feature = "loaders")]
pub mod loaders;

pub use actions::{ActionDef, ActionTable, ArgKind, codes};
pub use parser::TextOrderParser;
pub use repair::{RepairSummary, StackRepair};

#[cfg(feature = "loaders")]
pub use loaders::{
    ConfigLoader, ContentFactory, EntityDef, LoadResult, OrderDef, Placement, Scenario,
    ScenarioLoader,
};
