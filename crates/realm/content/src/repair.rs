//! Start-of-turn stacking repair.

use realm_core::{EntityFlags, Location, TurnEngine, TurnError, TurnHooks, World};

/// What a repair pass changed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RepairSummary {
    /// Actors whose parent no longer exists or cannot hold them.
    pub detached: usize,
    /// Followers whose moving flag disagreed with their leader's.
    pub flags_synced: usize,
}

impl RepairSummary {
    pub fn is_clean(&self) -> bool {
        self.detached == 0 && self.flags_synced == 0
    }
}

/// Restores the stacking invariants the scheduler relies on.
///
/// Runs as the consistency hook, before any command is loaded.
#[derive(Clone, Copy, Debug, Default)]
pub struct StackRepair;

impl StackRepair {
    pub fn run(world: &mut World) -> Result<RepairSummary, TurnError> {
        let mut summary = RepairSummary::default();
        let actors = world.actors();

        for &actor in &actors {
            let Some(location) = world.entity(actor)?.location() else {
                continue;
            };
            let valid = world.entities.get(location.id()).is_some_and(|parent| match location {
                Location::Place(_) => parent.kind().is_place(),
                Location::Actor(_) => parent.kind().can_lead(),
            });
            if !valid {
                tracing::warn!(%actor, parent = %location.id(), "detaching from dangling parent");
                world.detach(actor)?;
                summary.detached += 1;
            }
        }

        for &actor in &actors {
            let leader = world.leader(actor)?;
            if leader == actor {
                continue;
            }
            let moving = world.entity(leader)?.is_moving();
            let entity = world.entity_mut(actor)?;
            if entity.is_moving() != moving {
                entity.flags.set(EntityFlags::MOVING, moving);
                summary.flags_synced += 1;
            }
        }

        if !summary.is_clean() {
            tracing::info!(
                detached = summary.detached,
                flags_synced = summary.flags_synced,
                "stack repair"
            );
        }
        Ok(summary)
    }
}

impl TurnHooks for StackRepair {
    fn check_consistency(&self, engine: &mut TurnEngine<'_>) -> Result<(), TurnError> {
        Self::run(engine.world_mut()).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use realm_core::{EntityId, Kind, RealmConfig, Subkind};

    const CITY: EntityId = EntityId(50_001);

    fn world(units: &[u32]) -> World {
        let mut world = World::new(RealmConfig::default(), 5);
        world.insert_entity(CITY, Kind::Loc, Subkind::City).unwrap();
        for &id in units {
            world.insert_entity(EntityId(id), Kind::Char, Subkind::Pc).unwrap();
            world.move_to(EntityId(id), Location::Place(CITY)).unwrap();
        }
        world
    }

    #[test]
    fn followers_inherit_the_leader_moving_flag() {
        let mut world = world(&[5001, 5002, 5003]);
        world.move_to(EntityId(5002), Location::Actor(EntityId(5001))).unwrap();
        world.move_to(EntityId(5003), Location::Actor(EntityId(5002))).unwrap();
        world.entity_mut(EntityId(5001)).unwrap().flags |= EntityFlags::MOVING;

        let summary = StackRepair::run(&mut world).unwrap();

        assert_eq!(summary.flags_synced, 2);
        assert!(world.entity(EntityId(5003)).unwrap().is_moving());
        assert!(world.in_transit(EntityId(5003)).unwrap());
    }

    #[test]
    fn stale_moving_flag_on_a_follower_is_cleared() {
        let mut world = world(&[5001, 5002]);
        world.move_to(EntityId(5002), Location::Actor(EntityId(5001))).unwrap();
        world.entity_mut(EntityId(5002)).unwrap().flags |= EntityFlags::MOVING;

        let summary = StackRepair::run(&mut world).unwrap();

        assert_eq!(summary.flags_synced, 1);
        assert!(!world.in_transit(EntityId(5002)).unwrap());
    }

    #[test]
    fn stack_of_a_destroyed_moving_leader_needs_no_repair() {
        let mut world = world(&[5001, 5002, 5003]);
        world.move_to(EntityId(5002), Location::Actor(EntityId(5001))).unwrap();
        world.move_to(EntityId(5003), Location::Actor(EntityId(5002))).unwrap();
        world.set_stack_moving(EntityId(5001), true).unwrap();
        world.destroy_entity(EntityId(5001)).unwrap();

        assert!(StackRepair::run(&mut world).unwrap().is_clean());
        assert!(!world.entity(EntityId(5002)).unwrap().is_moving());
        assert!(!world.in_transit(EntityId(5003)).unwrap());
    }

    #[test]
    fn dangling_parent_is_detached() {
        let mut world = world(&[5001, 5002]);
        world.move_to(EntityId(5002), Location::Actor(EntityId(5001))).unwrap();
        world.entities.delete(EntityId(5001)).unwrap();

        let summary = StackRepair::run(&mut world).unwrap();

        assert_eq!(summary.detached, 1);
        assert_eq!(world.entity(EntityId(5002)).unwrap().location(), None);
        assert_eq!(world.leader(EntityId(5002)).unwrap(), EntityId(5002));
    }

    #[test]
    fn consistent_world_is_left_alone() {
        let mut world = world(&[5001, 5002]);
        world.move_to(EntityId(5002), Location::Actor(EntityId(5001))).unwrap();
        assert!(StackRepair::run(&mut world).unwrap().is_clean());
    }
}
