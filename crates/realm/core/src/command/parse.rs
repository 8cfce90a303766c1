//! Order-parser contract.

use thiserror::Error;

use super::{ActionCode, Operands};
use crate::error::{ErrorSeverity, RealmError};
use crate::state::{EntityId, World};

/// Action code and decoded operands for one line of order text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedOrder {
    pub code: ActionCode,
    pub operands: Operands,
}

/// Order text that could not be turned into a command.
///
/// Always recovered inside the turn: the command goes Failed → Idle and the
/// actor's next order is tried.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("empty order")]
    Empty,

    #[error("unknown order '{verb}'")]
    UnknownVerb { verb: String },

    #[error("'{verb}' expects at least {expected} argument(s), got {found}")]
    MissingOperand {
        verb: String,
        expected: usize,
        found: usize,
    },

    #[error("'{verb}' argument {position}: cannot use '{text}'")]
    BadOperand {
        verb: String,
        position: usize,
        text: String,
    },

    #[error("'{verb}' accepts at most {max} argument(s)")]
    TooManyOperands { verb: String, max: usize },

    #[error("order parsed to unregistered action {code}")]
    UnregisteredAction { code: u16 },
}

impl RealmError for ParseError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Recoverable
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Empty => "PARSE_EMPTY",
            Self::UnknownVerb { .. } => "PARSE_UNKNOWN_VERB",
            Self::MissingOperand { .. } => "PARSE_MISSING_OPERAND",
            Self::BadOperand { .. } => "PARSE_BAD_OPERAND",
            Self::TooManyOperands { .. } => "PARSE_TOO_MANY_OPERANDS",
            Self::UnregisteredAction { .. } => "PARSE_UNREGISTERED_ACTION",
        }
    }
}

/// Turns raw order text into an action code and operands.
pub trait OrderParser: Send + Sync {
    fn parse(&self, world: &World, actor: EntityId, text: &str) -> Result<ParsedOrder, ParseError>;
}
