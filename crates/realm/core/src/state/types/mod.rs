mod common;
mod kind;

pub use common::{Calendar, EntityId};
pub use kind::{Kind, Subkind};
