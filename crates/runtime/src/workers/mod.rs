//! Worker tasks that back the runtime orchestration.
//!
//! The simulation worker owns the authoritative world and processes turns
//! one command at a time.

mod simulation;

pub use simulation::{Command, SimulationWorker};
