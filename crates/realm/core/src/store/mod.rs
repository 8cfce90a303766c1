//! Sparse, ID-addressed entity table with per-category chain indices.
//!
//! Every live entity sits on exactly one kind chain and one subkind chain.
//! Chains are singly linked through the entities themselves and kept in
//! ascending ID order, so iteration is deterministic and restartable.
//! Deleted entities keep their slot forever: the ID is never handed out again.

mod alloc;
mod chain;
mod entity;

pub use chain::ChainIter;
pub use entity::{Entity, EntityFlags, Location};

use strum::EnumCount;

use crate::config::RealmConfig;
use crate::engine::TurnError;
use crate::state::{EntityId, Kind, Subkind};

pub(crate) use chain::Chain;

/// Entity table plus the two chain head tables.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityStore {
    slots: Vec<Option<Entity>>,
    kind_heads: Vec<Option<EntityId>>,
    subkind_heads: Vec<Option<EntityId>>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            kind_heads: vec![None; Kind::COUNT],
            subkind_heads: vec![None; Subkind::COUNT],
        }
    }

    /// Places a new entity at `id` and links it into both chains.
    ///
    /// Fails if `id` is outside the ID space or the slot was ever occupied,
    /// including by a since-deleted entity.
    pub fn allocate(
        &mut self,
        id: EntityId,
        kind: Kind,
        subkind: Subkind,
    ) -> Result<&mut Entity, TurnError> {
        if id.0 == 0 || id.0 > RealmConfig::MAX_ENTITY_ID {
            return Err(TurnError::IdOutOfRange { id });
        }
        if kind == Kind::Deleted {
            return Err(TurnError::InvalidKind { id, kind });
        }
        if self.is_occupied(id) {
            return Err(TurnError::DuplicateAllocation { id });
        }

        if self.slots.len() <= id.index() {
            self.slots.resize_with(id.index() + 1, || None);
        }
        self.slots[id.index()] = Some(Entity::new(id, kind, subkind));
        self.link(id, Chain::Kind(kind));
        self.link(id, Chain::Subkind(subkind));

        tracing::trace!(target: "realm::store", %id, kind = kind.as_str(), subkind = subkind.as_str(), "allocated");

        self.slot_mut(id).ok_or(TurnError::UnknownEntity { id })
    }

    /// Moves an entity to another kind chain, preserving sort order.
    pub fn change_kind(&mut self, id: EntityId, kind: Kind) -> Result<(), TurnError> {
        if kind == Kind::Deleted {
            return Err(TurnError::InvalidKind { id, kind });
        }
        let old = self.entity(id)?.kind();
        if old == kind {
            return Ok(());
        }
        self.unlink(id, Chain::Kind(old));
        if let Some(entity) = self.slot_mut(id) {
            entity.set_kind(kind);
        }
        self.link(id, Chain::Kind(kind));
        Ok(())
    }

    /// Moves an entity to another subkind chain, preserving sort order.
    pub fn change_subkind(&mut self, id: EntityId, subkind: Subkind) -> Result<(), TurnError> {
        let old = self.entity(id)?.subkind();
        if old == subkind {
            return Ok(());
        }
        self.unlink(id, Chain::Subkind(old));
        if let Some(entity) = self.slot_mut(id) {
            entity.set_subkind(subkind);
        }
        self.link(id, Chain::Subkind(subkind));
        Ok(())
    }

    /// Unlinks an entity from both chains and marks it deleted.
    ///
    /// The slot stays occupied so the ID is never reused. Any command the
    /// entity held is destroyed with it. Stacking links are the caller's
    /// concern (see [`crate::World::destroy_entity`]).
    pub fn delete(&mut self, id: EntityId) -> Result<(), TurnError> {
        let entity = self.entity(id)?;
        let (kind, subkind) = (entity.kind(), entity.subkind());

        self.unlink(id, Chain::Kind(kind));
        self.unlink(id, Chain::Subkind(subkind));

        if let Some(entity) = self.slot_mut(id) {
            entity.set_kind(Kind::Deleted);
            entity.command = None;
            entity.next_kind = None;
            entity.next_subkind = None;
        }

        tracing::trace!(target: "realm::store", %id, "deleted");
        Ok(())
    }

    /// Returns a live entity.
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.slot(id).filter(|e| !e.is_deleted())
    }

    /// Returns a live entity mutably.
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.slot_mut(id).filter(|e| !e.is_deleted())
    }

    /// Returns a live entity or an [`TurnError::UnknownEntity`].
    pub fn entity(&self, id: EntityId) -> Result<&Entity, TurnError> {
        self.get(id).ok_or(TurnError::UnknownEntity { id })
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Result<&mut Entity, TurnError> {
        self.get_mut(id).ok_or(TurnError::UnknownEntity { id })
    }

    /// True if the slot was ever allocated, deleted or not.
    pub fn is_occupied(&self, id: EntityId) -> bool {
        self.slot(id).is_some()
    }

    pub fn is_deleted(&self, id: EntityId) -> bool {
        self.slot(id).is_some_and(Entity::is_deleted)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.get(id).is_some()
    }

    /// Ascending iteration over one kind chain.
    pub fn iter_kind(&self, kind: Kind) -> ChainIter<'_> {
        ChainIter::new(self, Chain::Kind(kind))
    }

    /// Ascending iteration over one subkind chain.
    pub fn iter_subkind(&self, subkind: Subkind) -> ChainIter<'_> {
        ChainIter::new(self, Chain::Subkind(subkind))
    }

    /// All live entities in ID order.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.slots.iter().flatten().filter(|e| !e.is_deleted())
    }

    /// Number of live entities.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn slot(&self, id: EntityId) -> Option<&Entity> {
        self.slots.get(id.index()).and_then(Option::as_ref)
    }

    pub(crate) fn slot_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.slots.get_mut(id.index()).and_then(Option::as_mut)
    }
}

impl Default for EntityStore {
    fn default() -> Self {
        Self::new()
    }
}
