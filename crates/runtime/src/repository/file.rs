//! File-based WorldRepository implementation.

use std::fs;
use std::path::{Path, PathBuf};

use realm_core::World;

use super::{RepositoryError, Result, WorldRepository};

/// Stores each saved world as `world_{turn}.bin` in bincode format.
///
/// Writes go to a temporary file first and are renamed into place, so a
/// crash mid-save never leaves a truncated world behind.
pub struct FileWorldRepository {
    base_dir: PathBuf,
}

impl FileWorldRepository {
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn world_path(&self, turn: u32) -> PathBuf {
        self.base_dir.join(format!("world_{}.bin", turn))
    }
}

impl WorldRepository for FileWorldRepository {
    fn save(&self, turn: u32, world: &World) -> Result<()> {
        let path = self.world_path(turn);
        let temp_path = path.with_extension("bin.tmp");

        let bytes = world
            .to_bytes()
            .map_err(|e| RepositoryError::Serialization(e.to_string()))?;
        fs::write(&temp_path, bytes)?;
        fs::rename(&temp_path, &path)?;

        tracing::debug!("Saved world[{}] to {}", turn, path.display());
        Ok(())
    }

    fn load(&self, turn: u32) -> Result<Option<World>> {
        let path = self.world_path(turn);
        if !path.exists() {
            return Ok(None);
        }

        let bytes = fs::read(&path)?;
        let world =
            World::from_bytes(&bytes).map_err(|e| RepositoryError::Serialization(e.to_string()))?;

        tracing::debug!("Loaded world[{}] from {}", turn, path.display());
        Ok(Some(world))
    }

    fn exists(&self, turn: u32) -> bool {
        self.world_path(turn).exists()
    }

    fn delete(&self, turn: u32) -> Result<()> {
        let path = self.world_path(turn);
        if path.exists() {
            fs::remove_file(&path)?;
            tracing::debug!("Deleted world[{}]", turn);
        }
        Ok(())
    }

    fn list_turns(&self) -> Result<Vec<u32>> {
        let mut turns = Vec::new();
        for entry in fs::read_dir(&self.base_dir)? {
            let path = entry?.path();
            if let Some(filename) = path.file_name().and_then(|s| s.to_str())
                && let Some(turn) = filename
                    .strip_prefix("world_")
                    .and_then(|s| s.strip_suffix(".bin"))
                    .and_then(|s| s.parse::<u32>().ok())
            {
                turns.push(turn);
            }
        }
        turns.sort_unstable();
        Ok(turns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use realm_core::{EntityId, Kind, RealmConfig, Subkind};

    fn world() -> World {
        let mut world = World::new(RealmConfig::default(), 11);
        world.insert_entity(EntityId(5001), Kind::Char, Subkind::Pc).unwrap();
        world.queue_order(EntityId(5001), "wait 2").unwrap();
        world
    }

    #[test]
    fn saves_load_back_identically() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FileWorldRepository::new(dir.path()).unwrap();
        let world = world();

        repo.save(3, &world).unwrap();

        assert!(repo.exists(3));
        let loaded = repo.load(3).unwrap().unwrap();
        assert_eq!(loaded.digest().unwrap(), world.digest().unwrap());
        assert!(repo.load(4).unwrap().is_none());
    }

    #[test]
    fn lists_turns_in_order_and_ignores_strays() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FileWorldRepository::new(dir.path()).unwrap();
        for turn in [10, 2, 7] {
            repo.save(turn, &world()).unwrap();
        }
        fs::write(dir.path().join("notes.txt"), "x").unwrap();
        fs::write(dir.path().join("world_x.bin"), "x").unwrap();

        assert_eq!(repo.list_turns().unwrap(), vec![2, 7, 10]);

        repo.delete(7).unwrap();
        assert_eq!(repo.list_turns().unwrap(), vec![2, 10]);
        assert!(repo.latest().unwrap().is_some());
    }

    #[test]
    fn corrupt_file_is_a_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FileWorldRepository::new(dir.path()).unwrap();
        fs::write(dir.path().join("world_1.bin"), [0xff; 3]).unwrap();

        assert!(matches!(
            repo.load(1),
            Err(RepositoryError::Serialization(_))
        ));
    }
}
