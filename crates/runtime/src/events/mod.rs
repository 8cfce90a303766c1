//! Topic-based event bus for runtime events.
//!
//! Turn lifecycle notices and the per-command events of each processed turn
//! go to separate topics so consumers subscribe only to what they need.

mod bus;
mod types;

pub use bus::{Event, EventBus, Topic};
pub use types::{CommandNotice, TurnEvent};
