//! Event types for different topics.

use realm_core::CommandEvent;
use serde::{Deserialize, Serialize};

/// Turn lifecycle notices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnEvent {
    Started {
        turn: u32,
    },
    /// The turn ran to the end and its world was committed.
    Completed {
        turn: u32,
        completions: usize,
        /// Hex SHA-256 of the committed world.
        digest: Option<String>,
    },
    /// The turn aborted; the world is unchanged.
    Failed {
        turn: u32,
        error: String,
    },
    Saved {
        turn: u32,
    },
    SaveFailed {
        turn: u32,
        error: String,
    },
}

/// One command event from a processed turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandNotice {
    pub turn: u32,
    pub event: CommandEvent,
}
