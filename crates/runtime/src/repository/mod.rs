//! Repository layer for saved worlds.
//!
//! A world is saved after each processed turn under that turn's number. The
//! scheduler's bins are not part of the save; they are rebuilt on load.

mod error;
mod file;
mod memory;
mod traits;

pub use error::{RepositoryError, Result};
pub use file::FileWorldRepository;
pub use memory::InMemoryWorldRepo;
pub use traits::WorldRepository;
