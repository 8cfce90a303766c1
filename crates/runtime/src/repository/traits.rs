//! Repository contract for saving and loading worlds between turns.

use realm_core::World;

use super::Result;

/// Saved worlds indexed by the last turn they completed.
pub trait WorldRepository: Send + Sync {
    fn save(&self, turn: u32, world: &World) -> Result<()>;

    fn load(&self, turn: u32) -> Result<Option<World>>;

    fn exists(&self, turn: u32) -> bool;

    fn delete(&self, turn: u32) -> Result<()>;

    /// All saved turns in ascending order.
    fn list_turns(&self) -> Result<Vec<u32>>;

    /// The most recently completed turn, if any was saved.
    fn latest(&self) -> Result<Option<World>> {
        match self.list_turns()?.last() {
            Some(&turn) => self.load(turn),
            None => Ok(None),
        }
    }
}
