//! Unified error types surfaced by the runtime API.
//!
//! Wraps turn, order, repository and worker-coordination failures so clients
//! can bubble them up with consistent context.

use thiserror::Error;
use tokio::sync::oneshot;

use realm_core::{OrderError, TurnError};

pub use crate::repository::RepositoryError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("turn {turn} aborted: {source}")]
    Turn {
        turn: u32,
        #[source]
        source: TurnError,
    },

    #[error(transparent)]
    Order(#[from] OrderError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("runtime has no world repository configured")]
    NoRepository,

    #[error("runtime requires an initial world before building")]
    MissingWorld,

    #[error("simulation worker command channel closed")]
    CommandChannelClosed,

    #[error("simulation worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("simulation worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),
}
