//! Per-actor command record.
//!
//! A [`Command`] is the state machine instance describing what an actor is
//! doing right now:
//!
//! ```text
//! Idle ──load──▶ Queued ──select──▶ Active ──finish──▶ Idle
//!   ▲              (parse error)                        │
//!   └──────────── Failed ◀──────────────────────────────┘ (next order)
//! ```
//!
//! Transitions are driven by [`crate::engine::TurnEngine`]; handlers only
//! touch the fields exposed through [`CommandContext`].

mod handler;
mod parse;

pub use handler::{ActionSpec, CommandContext, HandlerTable, Routine};
pub use parse::{OrderParser, ParseError, ParsedOrder};

use std::fmt;

use arrayvec::ArrayVec;

use crate::config::RealmConfig;
use crate::state::EntityId;

/// Lifecycle state of a command record.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CommandState {
    #[default]
    Idle,
    Queued,
    Active,
    Failed,
}

/// Success or failure of the last start/finish invocation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Outcome {
    #[default]
    Success,
    Failure,
}

impl Outcome {
    pub const fn from_bool(ok: bool) -> Self {
        if ok { Self::Success } else { Self::Failure }
    }

    pub const fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Scheduling tier. `0` is the most urgent, `TIERS - 1` the least.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Priority(u8);

impl Priority {
    pub const URGENT: Self = Self(0);
    pub const LOWEST: Self = Self(RealmConfig::TIERS as u8 - 1);

    /// Returns `None` for values outside `0..TIERS`.
    pub const fn new(tier: u8) -> Option<Self> {
        if (tier as usize) < RealmConfig::TIERS {
            Some(Self(tier))
        } else {
            None
        }
    }

    #[inline]
    pub const fn get(self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// All tiers, most urgent first.
    pub fn all() -> impl Iterator<Item = Priority> {
        (0..RealmConfig::TIERS as u8).map(Self)
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}", self.0)
    }
}

/// Code of a parsed action, as assigned by the handler table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionCode(pub u16);

/// A single decoded order argument.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Operand {
    Entity(EntityId),
    Number(i64),
    Word(String),
}

pub type Operands = ArrayVec<Operand, { RealmConfig::MAX_OPERANDS }>;

/// What an actor is currently doing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Command {
    pub state: CommandState,
    /// Parsed action; `None` while Idle or Failed.
    pub action: Option<ActionCode>,
    pub priority: Priority,
    /// Days left before the finish routine runs. May be raised by handlers
    /// to keep the command alive.
    pub wait: i32,
    /// Run the finish routine every day, not only when `wait` expires.
    pub poll: bool,
    pub operands: Operands,
    /// Order text the command was parsed from.
    pub text: String,
    /// Days stepped since activation.
    pub days_executing: u32,
    pub outcome: Outcome,
    /// Days of delay imposed from outside; burned before `wait`.
    pub extra_delay: u32,
    /// Skip the finish routine when the command completes.
    pub inhibit_finish: bool,
    /// Outcome of the previous command this actor ran.
    pub previous_outcome: Option<Outcome>,
    /// Selected during the current day; not stepped until tomorrow.
    pub started_today: bool,
}

impl Command {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_idle(&self) -> bool {
        self.state == CommandState::Idle
    }

    pub fn operand(&self, index: usize) -> Option<&Operand> {
        self.operands.get(index)
    }

    pub fn entity_operand(&self, index: usize) -> Option<EntityId> {
        match self.operand(index)? {
            Operand::Entity(id) => Some(*id),
            _ => None,
        }
    }

    pub fn number_operand(&self, index: usize) -> Option<i64> {
        match self.operand(index)? {
            Operand::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the record to Idle, keeping only cross-command history.
    pub(crate) fn reset_to_idle(&mut self) {
        let previous_outcome = self.previous_outcome;
        let outcome = self.outcome;
        *self = Self {
            previous_outcome,
            outcome,
            ..Self::default()
        };
    }
}
