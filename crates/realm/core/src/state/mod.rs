//! The world context object.
//!
//! [`World`] owns everything one game instance needs between turns: the
//! entity table, pending orders, the calendar and the allocation seed. The
//! scheduler's bins and running set are derived data; they are skipped on
//! save and rebuilt from the command records on load.

mod types;

pub use types::{Calendar, EntityId, Kind, Subkind};

use crate::command::{Command, CommandState};
use crate::config::RealmConfig;
use crate::engine::{Scheduler, TurnError};
use crate::env::{PcgRng, compute_seed};
use crate::orders::{OrderBook, OrderError};
use crate::store::{Entity, EntityStore};

#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct World {
    pub config: RealmConfig,
    seed: u64,
    alloc_nonce: u64,
    pub calendar: Calendar,
    pub entities: EntityStore,
    pub orders: OrderBook,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub(crate) scheduler: Scheduler,
}

impl World {
    pub fn new(config: RealmConfig, seed: u64) -> Self {
        let orders = OrderBook::new(config.max_orders_per_queue);
        Self {
            config,
            seed,
            alloc_nonce: 0,
            calendar: Calendar::new(),
            entities: EntityStore::new(),
            orders,
            scheduler: Scheduler::default(),
        }
    }

    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Creates an entity at a fresh ID drawn from its category's ranges.
    pub fn create_entity(&mut self, kind: Kind, subkind: Subkind) -> Result<EntityId, TurnError> {
        let ranges = self.config.ranges_for(kind, subkind);
        let seed = compute_seed(self.seed, self.alloc_nonce, kind.index() as u32);
        self.alloc_nonce += 1;

        let id = self
            .entities
            .find_free_id(&ranges, &PcgRng, seed)
            .ok_or(TurnError::AllocationExhausted { kind, subkind })?;
        self.entities.allocate(id, kind, subkind)?;
        Ok(id)
    }

    /// Creates an entity at a caller-chosen ID.
    pub fn insert_entity(
        &mut self,
        id: EntityId,
        kind: Kind,
        subkind: Subkind,
    ) -> Result<&mut Entity, TurnError> {
        self.entities.allocate(id, kind, subkind)
    }

    /// Deletes an entity, detaching it from its stack and the scheduler.
    ///
    /// Children it carried move up to wherever the entity stood. Pending
    /// orders filed for it are dropped.
    pub fn destroy_entity(&mut self, id: EntityId) -> Result<(), TurnError> {
        let owner = self.owner_of(id)?;
        self.release_children(id)?;
        self.detach(id)?;
        self.scheduler.remove(id);
        self.orders.clear(owner, id);
        self.entities.delete(id)
    }

    pub fn entity(&self, id: EntityId) -> Result<&Entity, TurnError> {
        self.entities.entity(id)
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Result<&mut Entity, TurnError> {
        self.entities.entity_mut(id)
    }

    pub fn command(&self, actor: EntityId) -> Option<&Command> {
        self.entities.get(actor)?.command.as_ref()
    }

    pub fn command_mut(&mut self, actor: EntityId) -> Option<&mut Command> {
        self.entities.get_mut(actor)?.command.as_mut()
    }

    /// Returns the actor's command, creating an Idle one on first use.
    pub fn ensure_command(&mut self, actor: EntityId) -> Result<&mut Command, TurnError> {
        let entity = self.entities.entity_mut(actor)?;
        if !entity.kind().can_act() {
            return Err(TurnError::NotAnActor { id: actor });
        }
        Ok(entity.command.get_or_insert_with(Command::new))
    }

    /// Player the actor's orders are filed under. A player owns itself.
    pub fn owner_of(&self, actor: EntityId) -> Result<EntityId, TurnError> {
        Ok(self.entities.entity(actor)?.owner.unwrap_or(actor))
    }

    /// Appends an order to the actor's queue under its controlling player.
    pub fn queue_order(
        &mut self,
        actor: EntityId,
        text: impl Into<String>,
    ) -> Result<(), OrderError> {
        let owner = self
            .owner_of(actor)
            .map_err(|_| OrderError::UnknownActor { actor })?;
        self.orders.push(owner, actor, text)
    }

    /// Asks the running engine to load the actor's next order once the
    /// current dispatch returns.
    pub fn request_load(&mut self, actor: EntityId) {
        self.scheduler.request_load(actor);
    }

    /// Raises the automatic engagement flag.
    pub fn request_engagement_check(&mut self) {
        self.scheduler.engagement_pending = true;
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Actors that can hold commands, players first, each in ascending ID.
    pub fn actors(&self) -> Vec<EntityId> {
        self.entities
            .iter_kind(Kind::Player)
            .chain(self.entities.iter_kind(Kind::Char))
            .collect()
    }

    /// Rebuilds bins and running set from the persisted command records.
    pub fn rebuild_schedule(&mut self) {
        let mut scheduler = Scheduler::default();
        for actor in self.actors() {
            let Some(command) = self.command(actor) else {
                continue;
            };
            match command.state {
                CommandState::Queued => scheduler.enqueue(actor, command.priority),
                CommandState::Active => scheduler.activate(actor),
                CommandState::Idle | CommandState::Failed => {}
            }
        }
        self.scheduler = scheduler;
    }
}

#[cfg(feature = "serde")]
mod persist {
    use sha2::{Digest, Sha256};
    use thiserror::Error;

    use super::World;

    #[derive(Debug, Error)]
    pub enum PersistError {
        #[error("failed to encode world: {0}")]
        Encode(bincode::Error),
        #[error("failed to decode world: {0}")]
        Decode(bincode::Error),
    }

    impl World {
        pub fn to_bytes(&self) -> Result<Vec<u8>, PersistError> {
            bincode::serialize(self).map_err(PersistError::Encode)
        }

        /// Decodes a saved world and rebuilds its scheduler state.
        pub fn from_bytes(bytes: &[u8]) -> Result<Self, PersistError> {
            let mut world: World = bincode::deserialize(bytes).map_err(PersistError::Decode)?;
            world.rebuild_schedule();
            Ok(world)
        }

        /// SHA-256 over the encoded world.
        pub fn digest(&self) -> Result<[u8; 32], PersistError> {
            let bytes = self.to_bytes()?;
            Ok(Sha256::digest(&bytes).into())
        }
    }
}

#[cfg(feature = "serde")]
pub use persist::PersistError;
