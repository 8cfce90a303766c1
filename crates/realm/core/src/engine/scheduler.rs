//! Priority bins, running set and the current-tier cursor.
//!
//! An actor is in at most one of {one bin, the running set}. Every placement
//! removes the actor from wherever it was first, so the invariant cannot be
//! broken through this API.

use std::collections::BTreeSet;

use crate::command::Priority;
use crate::config::RealmConfig;
use crate::state::EntityId;

/// Where the scheduler currently holds an actor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Slot {
    Bin(Priority),
    Running,
}

/// Per-turn scheduling state. Never persisted; rebuilt from command records.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Scheduler {
    bins: [BTreeSet<EntityId>; RealmConfig::TIERS],
    running: BTreeSet<EntityId>,
    cursor: Option<Priority>,
    pub(crate) engagement_pending: bool,
    pub(crate) engagement_checked: bool,
    pending_loads: Vec<EntityId>,
}

impl Scheduler {
    /// Clears bins, running set, cursor and per-day flags.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Places the actor in the bin for `priority`.
    pub fn enqueue(&mut self, actor: EntityId, priority: Priority) {
        self.remove(actor);
        self.bins[priority.index()].insert(actor);
    }

    /// Moves the actor into the running set.
    pub fn activate(&mut self, actor: EntityId) {
        self.remove(actor);
        self.running.insert(actor);
    }

    /// Drops the actor from every bin and the running set.
    pub fn remove(&mut self, actor: EntityId) -> Option<Slot> {
        let slot = self.slot_of(actor);
        match slot {
            Some(Slot::Bin(priority)) => {
                self.bins[priority.index()].remove(&actor);
            }
            Some(Slot::Running) => {
                self.running.remove(&actor);
            }
            None => {}
        }
        slot
    }

    pub fn slot_of(&self, actor: EntityId) -> Option<Slot> {
        if self.running.contains(&actor) {
            return Some(Slot::Running);
        }
        Priority::all()
            .find(|p| self.bins[p.index()].contains(&actor))
            .map(Slot::Bin)
    }

    pub fn bin(&self, priority: Priority) -> &BTreeSet<EntityId> {
        &self.bins[priority.index()]
    }

    pub fn running(&self) -> &BTreeSet<EntityId> {
        &self.running
    }

    /// Tier currently being drained.
    pub fn cursor(&self) -> Option<Priority> {
        self.cursor
    }

    pub(crate) fn set_cursor(&mut self, cursor: Option<Priority>) {
        self.cursor = cursor;
    }

    /// Lowers the cursor to `tier` if it is more urgent than the current one.
    /// Returns true if the cursor moved.
    pub(crate) fn preempt(&mut self, tier: Priority) -> bool {
        match self.cursor {
            Some(current) if tier < current => {
                self.cursor = Some(tier);
                true
            }
            _ => false,
        }
    }

    pub fn engagement_pending(&self) -> bool {
        self.engagement_pending
    }

    pub(crate) fn request_load(&mut self, actor: EntityId) {
        if !self.pending_loads.contains(&actor) {
            self.pending_loads.push(actor);
        }
    }

    pub(crate) fn take_pending_loads(&mut self) -> Vec<EntityId> {
        std::mem::take(&mut self.pending_loads)
    }

    /// Total actors waiting across all bins.
    pub fn queued_len(&self) -> usize {
        self.bins.iter().map(BTreeSet::len).sum()
    }

    /// Checks the one-slot invariant. Returns the first actor found twice.
    pub fn find_duplicate(&self) -> Option<EntityId> {
        let mut seen = BTreeSet::new();
        self.bins
            .iter()
            .chain(std::iter::once(&self.running))
            .flatten()
            .copied()
            .find(|id| !seen.insert(*id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(tier: u8) -> Priority {
        Priority::new(tier).unwrap()
    }

    #[test]
    fn placement_moves_rather_than_copies() {
        let mut scheduler = Scheduler::default();
        let actor = EntityId(5001);

        scheduler.enqueue(actor, p(3));
        scheduler.enqueue(actor, p(1));
        assert_eq!(scheduler.slot_of(actor), Some(Slot::Bin(p(1))));
        assert!(scheduler.bin(p(3)).is_empty());

        scheduler.activate(actor);
        assert_eq!(scheduler.slot_of(actor), Some(Slot::Running));
        assert_eq!(scheduler.queued_len(), 0);
        assert_eq!(scheduler.find_duplicate(), None);

        assert_eq!(scheduler.remove(actor), Some(Slot::Running));
        assert_eq!(scheduler.slot_of(actor), None);
    }

    #[test]
    fn preempt_only_lowers_the_cursor() {
        let mut scheduler = Scheduler::default();
        assert!(!scheduler.preempt(p(0)));

        scheduler.set_cursor(Some(p(2)));
        assert!(!scheduler.preempt(p(3)));
        assert!(!scheduler.preempt(p(2)));
        assert!(scheduler.preempt(p(0)));
        assert_eq!(scheduler.cursor(), Some(p(0)));
    }

    #[test]
    fn pending_loads_are_deduplicated() {
        let mut scheduler = Scheduler::default();
        scheduler.request_load(EntityId(7));
        scheduler.request_load(EntityId(7));
        scheduler.request_load(EntityId(3));

        assert_eq!(scheduler.take_pending_loads(), vec![EntityId(7), EntityId(3)]);
        assert!(scheduler.take_pending_loads().is_empty());
    }
}
