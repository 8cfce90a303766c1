//! Common error infrastructure for realm-core.
//!
//! Domain errors (`TurnError`, `ParseError`, `OrderError`) live next to the
//! code that raises them. This module holds the classification shared by all
//! of them so the runtime can decide whether a failure aborts a turn.

/// Severity level of an error, used for categorization and recovery strategies.
///
/// - **Recoverable**: handled inside the turn (unparseable order text)
/// - **Validation**: invalid input rejected at the boundary (queue full)
/// - **Internal**: unexpected inconsistency between indices
/// - **Fatal**: world state corrupted or exhausted, the turn must abort
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    Recoverable,
    Validation,
    Internal,
    Fatal,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    /// Returns true if processing may continue after this error.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable | Self::Validation)
    }

    /// Returns true if this error must abort the running turn.
    pub const fn aborts_turn(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Common trait for all realm-core errors.
pub trait RealmError: core::fmt::Display + core::fmt::Debug {
    fn severity(&self) -> ErrorSeverity;

    /// Stable identifier for this error variant, for logs and tests.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}
