use thiserror::Error;

use crate::error::{ErrorSeverity, RealmError};
use crate::state::{EntityId, Kind, Subkind};

/// Errors that abort turn processing.
///
/// Parse failures and handler failures never surface here; they are ordinary
/// control flow inside the turn. Anything that does is treated as corrupted
/// or exhausted world state.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum TurnError {
    #[error("no free id left for {kind:?}/{subkind:?}")]
    AllocationExhausted { kind: Kind, subkind: Subkind },

    #[error("slot {id} is already occupied")]
    DuplicateAllocation { id: EntityId },

    #[error("id {id} is outside the entity id space")]
    IdOutOfRange { id: EntityId },

    #[error("{id} cannot take kind {kind:?}")]
    InvalidKind { id: EntityId, kind: Kind },

    #[error("entity {id} does not exist")]
    UnknownEntity { id: EntityId },

    #[error("entity {id} cannot hold a command")]
    NotAnActor { id: EntityId },

    #[error("chain index corrupted at {id}: {reason}")]
    ChainCorrupted { id: EntityId, reason: &'static str },

    #[error("stack cycle through {id}")]
    StackCycle { id: EntityId },

    #[error("{id} cannot be placed in {target}")]
    InvalidLocation { id: EntityId, target: EntityId },

    #[error("actor {id} has no command record")]
    NoCommand { id: EntityId },

    #[error("hook '{hook}' failed: {reason}")]
    HookFailed { hook: String, reason: String },
}

impl RealmError for TurnError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::InvalidLocation { .. } | Self::HookFailed { .. } => ErrorSeverity::Internal,
            _ => ErrorSeverity::Fatal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::AllocationExhausted { .. } => "TURN_ALLOCATION_EXHAUSTED",
            Self::DuplicateAllocation { .. } => "TURN_DUPLICATE_ALLOCATION",
            Self::IdOutOfRange { .. } => "TURN_ID_OUT_OF_RANGE",
            Self::InvalidKind { .. } => "TURN_INVALID_KIND",
            Self::UnknownEntity { .. } => "TURN_UNKNOWN_ENTITY",
            Self::NotAnActor { .. } => "TURN_NOT_AN_ACTOR",
            Self::ChainCorrupted { .. } => "TURN_CHAIN_CORRUPTED",
            Self::StackCycle { .. } => "TURN_STACK_CYCLE",
            Self::InvalidLocation { .. } => "TURN_INVALID_LOCATION",
            Self::NoCommand { .. } => "TURN_NO_COMMAND",
            Self::HookFailed { .. } => "TURN_HOOK_FAILED",
        }
    }
}
