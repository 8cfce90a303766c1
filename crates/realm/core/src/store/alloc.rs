//! Pseudo-random probing allocator for fresh entity IDs.

use super::EntityStore;
use crate::config::IdRange;
use crate::env::RngOracle;
use crate::state::EntityId;

impl EntityStore {
    /// Finds a never-used ID, trying each range in order.
    ///
    /// Within a range the search starts at a pseudo-random point derived
    /// from `seed`, probes forward to the end of the range, then wraps to
    /// its start. Returns `None` once every range is exhausted.
    pub fn find_free_id(
        &self,
        ranges: &[IdRange],
        rng: &dyn RngOracle,
        seed: u64,
    ) -> Option<EntityId> {
        ranges
            .iter()
            .filter(|range| !range.is_empty())
            .find_map(|range| self.probe_range(*range, rng, seed))
    }

    fn probe_range(&self, range: IdRange, rng: &dyn RngOracle, seed: u64) -> Option<EntityId> {
        let start = rng.range(seed, range.low, range.high);

        (start..=range.high)
            .chain(range.low..start)
            .map(EntityId)
            .find(|&id| id.0 != 0 && !self.is_occupied(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::PcgRng;
    use crate::state::{Kind, Subkind};

    /// Always starts probing at the bottom of the range.
    struct LowRng;

    impl RngOracle for LowRng {
        fn next_u32(&self, _seed: u64) -> u32 {
            0
        }
    }

    #[test]
    fn probes_forward_then_wraps() {
        let mut store = EntityStore::new();
        for id in 10..=12 {
            store.allocate(EntityId(id), Kind::Char, Subkind::Pc).unwrap();
        }

        let found = store.find_free_id(&[IdRange::new(10, 13)], &LowRng, 0);
        assert_eq!(found, Some(EntityId(13)));

        store.allocate(EntityId(13), Kind::Char, Subkind::Pc).unwrap();
        let found = store.find_free_id(&[IdRange::new(10, 13)], &LowRng, 0);
        assert_eq!(found, None);
    }

    #[test]
    fn falls_back_to_secondary_range() {
        let mut store = EntityStore::new();
        store.allocate(EntityId(5), Kind::Char, Subkind::Pc).unwrap();

        let ranges = [IdRange::new(5, 5), IdRange::new(20, 29)];
        let found = store.find_free_id(&ranges, &PcgRng, 42).unwrap();
        assert!((20..=29).contains(&found.0));
    }

    #[test]
    fn deleted_slots_are_not_returned() {
        let mut store = EntityStore::new();
        store.allocate(EntityId(3), Kind::Item, Subkind::None).unwrap();
        store.delete(EntityId(3)).unwrap();

        assert_eq!(store.find_free_id(&[IdRange::new(3, 3)], &LowRng, 0), None);
    }

    #[test]
    fn same_seed_yields_same_id() {
        let store = EntityStore::new();
        let ranges = [IdRange::new(1_000, 9_999)];
        let a = store.find_free_id(&ranges, &PcgRng, 7);
        let b = store.find_free_id(&ranges, &PcgRng, 7);
        assert_eq!(a, b);
    }
}
