//! Turn hook system for runtime orchestration.
//!
//! The engine calls out to [`realm_core::TurnHooks`] at fixed points of a
//! turn. [`HookRegistry`] implements that trait by fanning each call out to
//! the registered [`TurnHook`]s of the matching [`HookPhase`], in priority
//! order, and applies each hook's [`HookCriticality`] to its failures.

mod consistency;
mod registry;
mod standing;

pub use consistency::ConsistencyHook;
pub use registry::HookRegistry;
pub use standing::StandingOrderHook;

use realm_core::{TurnEngine, TurnError};

/// Defines the criticality level of a hook for error handling.
///
/// Errors classified as fatal by the engine abort the turn whatever the
/// hook's criticality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookCriticality {
    /// Hook failure aborts the turn.
    Critical,

    /// Hook failure is logged as an error and the turn continues.
    Important,

    /// Hook failure is logged at debug level and ignored.
    Optional,
}

/// Point in the turn at which a hook runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HookPhase {
    /// Before any command is loaded.
    Consistency,
    /// After idle actors have loaded their first order.
    StandingOrders,
    Watchers,
    Requeue,
    PlayerStandingOrders,
    /// Day 1, before the first drain.
    Trades,
    /// Automatic engagement check.
    Engagement,
}

impl HookPhase {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Consistency => "consistency",
            Self::StandingOrders => "standing_orders",
            Self::Watchers => "watchers",
            Self::Requeue => "requeue",
            Self::PlayerStandingOrders => "player_standing_orders",
            Self::Trades => "trades",
            Self::Engagement => "engagement",
        }
    }
}

/// A unit of turn-level behaviour plugged into the engine.
///
/// Hooks are sorted by priority within their phase (lower values run first).
pub trait TurnHook: Send + Sync {
    /// Returns a human-readable name for this hook (used in logging and errors).
    fn name(&self) -> &'static str;

    fn phase(&self) -> HookPhase;

    fn priority(&self) -> i32 {
        0
    }

    fn criticality(&self) -> HookCriticality {
        HookCriticality::Important
    }

    fn run(&self, engine: &mut TurnEngine<'_>) -> Result<(), TurnError>;
}
