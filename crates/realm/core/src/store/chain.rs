//! Sorted singly linked chains threaded through the entity table.

use std::collections::BTreeSet;

use strum::IntoEnumIterator;

use super::EntityStore;
use crate::engine::TurnError;
use crate::state::{EntityId, Kind, Subkind};

/// Identifies one chain: a kind chain or a subkind chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Chain {
    Kind(Kind),
    Subkind(Subkind),
}

impl EntityStore {
    fn head(&self, chain: Chain) -> Option<EntityId> {
        match chain {
            Chain::Kind(kind) => self.kind_heads.get(kind.index()).copied().flatten(),
            Chain::Subkind(sub) => self.subkind_heads.get(sub.index()).copied().flatten(),
        }
    }

    fn set_head(&mut self, chain: Chain, head: Option<EntityId>) {
        let slot = match chain {
            Chain::Kind(kind) => self.kind_heads.get_mut(kind.index()),
            Chain::Subkind(sub) => self.subkind_heads.get_mut(sub.index()),
        };
        if let Some(slot) = slot {
            *slot = head;
        }
    }

    fn next_of(&self, id: EntityId, chain: Chain) -> Option<EntityId> {
        let entity = self.slot(id)?;
        match chain {
            Chain::Kind(_) => entity.next_kind,
            Chain::Subkind(_) => entity.next_subkind,
        }
    }

    fn set_next(&mut self, id: EntityId, chain: Chain, next: Option<EntityId>) {
        if let Some(entity) = self.slot_mut(id) {
            match chain {
                Chain::Kind(_) => entity.next_kind = next,
                Chain::Subkind(_) => entity.next_subkind = next,
            }
        }
    }

    /// Inserts `id` after the last member smaller than it.
    pub(crate) fn link(&mut self, id: EntityId, chain: Chain) {
        let mut prev = None;
        let mut cursor = self.head(chain);
        while let Some(current) = cursor {
            if current > id {
                break;
            }
            debug_assert_ne!(current, id, "{id} linked twice into {chain:?}");
            prev = Some(current);
            cursor = self.next_of(current, chain);
        }

        self.set_next(id, chain, cursor);
        match prev {
            None => self.set_head(chain, Some(id)),
            Some(prev) => self.set_next(prev, chain, Some(id)),
        }
    }

    /// Removes `id` from the chain. Returns false if it was not a member.
    pub(crate) fn unlink(&mut self, id: EntityId, chain: Chain) -> bool {
        let mut prev = None;
        let mut cursor = self.head(chain);
        while let Some(current) = cursor {
            if current == id {
                let next = self.next_of(id, chain);
                match prev {
                    None => self.set_head(chain, next),
                    Some(prev) => self.set_next(prev, chain, next),
                }
                self.set_next(id, chain, None);
                return true;
            }
            if current > id {
                break;
            }
            prev = Some(current);
            cursor = self.next_of(current, chain);
        }
        false
    }

    /// Checks every chain for ascending order, correct membership, and that
    /// each live entity appears on exactly one kind and one subkind chain.
    pub fn verify_chains(&self) -> Result<(), TurnError> {
        let mut seen_kind = BTreeSet::new();
        for kind in Kind::iter() {
            self.verify_chain(Chain::Kind(kind), &mut seen_kind)?;
        }

        let mut seen_subkind = BTreeSet::new();
        for subkind in Subkind::iter() {
            self.verify_chain(Chain::Subkind(subkind), &mut seen_subkind)?;
        }

        for entity in self.iter() {
            if !seen_kind.contains(&entity.id()) || !seen_subkind.contains(&entity.id()) {
                return Err(TurnError::ChainCorrupted {
                    id: entity.id(),
                    reason: "live entity missing from a chain",
                });
            }
        }
        Ok(())
    }

    fn verify_chain(
        &self,
        chain: Chain,
        seen: &mut BTreeSet<EntityId>,
    ) -> Result<(), TurnError> {
        let mut last: Option<EntityId> = None;
        for id in ChainIter::new(self, chain) {
            let corrupted = |reason| TurnError::ChainCorrupted { id, reason };
            let entity = self.get(id).ok_or(corrupted("chain references a dead slot"))?;

            let member = match chain {
                Chain::Kind(kind) => entity.kind() == kind,
                Chain::Subkind(sub) => entity.subkind() == sub,
            };
            if !member {
                return Err(corrupted("entity linked into the wrong chain"));
            }
            if last.is_some_and(|last| last >= id) {
                return Err(corrupted("chain out of order"));
            }
            if !seen.insert(id) {
                return Err(corrupted("entity linked into two chains"));
            }
            last = Some(id);
        }
        Ok(())
    }
}

/// Ascending iterator over the members of one chain.
///
/// Holds only a cursor, so a fresh iterator always restarts from the head.
#[derive(Clone)]
pub struct ChainIter<'a> {
    store: &'a EntityStore,
    chain: Chain,
    cursor: Option<EntityId>,
}

impl<'a> ChainIter<'a> {
    pub(crate) fn new(store: &'a EntityStore, chain: Chain) -> Self {
        Self {
            store,
            chain,
            cursor: store.head(chain),
        }
    }
}

impl Iterator for ChainIter<'_> {
    type Item = EntityId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.cursor?;
        self.cursor = self.store.next_of(current, self.chain);
        Some(current)
    }
}
