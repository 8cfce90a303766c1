//! In-memory WorldRepository implementation for tests and local runs.

use std::collections::BTreeMap;
use std::sync::RwLock;

use realm_core::World;

use super::{RepositoryError, Result, WorldRepository};

#[derive(Default)]
pub struct InMemoryWorldRepo {
    worlds: RwLock<BTreeMap<u32, World>>,
}

impl InMemoryWorldRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

impl WorldRepository for InMemoryWorldRepo {
    fn save(&self, turn: u32, world: &World) -> Result<()> {
        let mut worlds = self
            .worlds
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        worlds.insert(turn, world.clone());
        Ok(())
    }

    fn load(&self, turn: u32) -> Result<Option<World>> {
        let worlds = self
            .worlds
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(worlds.get(&turn).cloned())
    }

    fn exists(&self, turn: u32) -> bool {
        self.worlds
            .read()
            .map(|worlds| worlds.contains_key(&turn))
            .unwrap_or(false)
    }

    fn delete(&self, turn: u32) -> Result<()> {
        let mut worlds = self
            .worlds
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        worlds.remove(&turn);
        Ok(())
    }

    fn list_turns(&self) -> Result<Vec<u32>> {
        let worlds = self
            .worlds
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(worlds.keys().copied().collect())
    }
}
