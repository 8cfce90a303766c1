//! Command implementations for xtask
//!
//! Each command is a separate module that implements its own CLI args and execution logic.

mod clean;
mod read_state;
mod simulate;

pub use clean::Clean;
pub use read_state::ReadState;
pub use simulate::Simulate;
