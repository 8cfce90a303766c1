//! Scenario loader: the starting entities of a world and their first orders.

use std::path::Path;

use realm_core::{EntityFlags, EntityId, Kind, Location, RealmConfig, Subkind, World};
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Scenario structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub seed: u64,
    /// Turn the world resumes from; the first processed turn is `turn + 1`.
    #[serde(default)]
    pub turn: u32,
    pub entities: Vec<EntityDef>,
    #[serde(default)]
    pub orders: Vec<OrderDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityDef {
    pub id: u32,
    pub kind: Kind,
    #[serde(default = "no_subkind")]
    pub subkind: Subkind,
    #[serde(default)]
    pub owner: Option<u32>,
    #[serde(default)]
    pub location: Option<Placement>,
    #[serde(default)]
    pub prisoner: bool,
    #[serde(default)]
    pub moving: bool,
}

/// Where an entity starts. Applied in file order, which fixes arrival order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Placement {
    /// Standing in a place.
    In(u32),
    /// Stacked under another unit.
    With(u32),
}

impl From<Placement> for Location {
    fn from(placement: Placement) -> Self {
        match placement {
            Placement::In(id) => Location::Place(EntityId(id)),
            Placement::With(id) => Location::Actor(EntityId(id)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDef {
    pub actor: u32,
    pub orders: Vec<String>,
}

fn no_subkind() -> Subkind {
    Subkind::None
}

impl Scenario {
    /// Builds a fresh world from the scenario.
    pub fn build(&self, config: RealmConfig) -> LoadResult<World> {
        let mut world = World::new(config, self.seed);
        world.calendar.turn = self.turn;

        for def in &self.entities {
            let entity = world
                .insert_entity(EntityId(def.id), def.kind, def.subkind)
                .map_err(|e| anyhow::anyhow!("Failed to create entity {}: {}", def.id, e))?;
            entity.owner = def.owner.map(EntityId);
            entity.flags.set(EntityFlags::PRISONER, def.prisoner);
            entity.flags.set(EntityFlags::MOVING, def.moving);
        }

        for def in &self.entities {
            if let Some(owner) = def.owner {
                let is_player = world
                    .entities
                    .get(EntityId(owner))
                    .is_some_and(|e| e.kind() == Kind::Player);
                if !is_player {
                    anyhow::bail!("Entity {} is owned by {}, which is not a player", def.id, owner);
                }
            }
            if let Some(placement) = def.location {
                world
                    .move_to(EntityId(def.id), placement.into())
                    .map_err(|e| anyhow::anyhow!("Failed to place entity {}: {}", def.id, e))?;
            }
        }

        for def in &self.orders {
            for text in &def.orders {
                world
                    .queue_order(EntityId(def.actor), text.as_str())
                    .map_err(|e| anyhow::anyhow!("Failed to queue order '{}': {}", text, e))?;
            }
        }

        tracing::info!(
            scenario = %self.name,
            entities = self.entities.len(),
            orders = world.orders.total(),
            "scenario built"
        );
        Ok(world)
    }
}

/// Loader for scenarios from RON files.
pub struct ScenarioLoader;

impl ScenarioLoader {
    pub fn load(path: &Path) -> LoadResult<Scenario> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<Scenario> {
        ron::from_str(content).map_err(|e| anyhow::anyhow!("Failed to parse scenario RON: {}", e))
    }
}
