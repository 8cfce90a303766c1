//! Stacking hierarchy: actors standing in places or under other actors.
//!
//! Parent and leader lookups are pure functions over the entity table. The
//! traversal is bounded by `max_stack_depth`; running past it means the
//! parent links form a cycle, which is reported as corrupted state.

use crate::engine::TurnError;
use crate::state::{EntityId, World};
use crate::store::{EntityFlags, Location};

impl World {
    /// Parent actor, if the entity is stacked under one.
    pub fn parent(&self, id: EntityId) -> Result<Option<EntityId>, TurnError> {
        Ok(match self.entity(id)?.location() {
            Some(Location::Actor(parent)) => Some(parent),
            _ => None,
        })
    }

    /// Follows parent links up to the stack leader.
    pub fn leader(&self, id: EntityId) -> Result<EntityId, TurnError> {
        let mut current = id;
        for _ in 0..=self.config.max_stack_depth {
            match self.parent(current)? {
                Some(parent) => current = parent,
                None => return Ok(current),
            }
        }
        Err(TurnError::StackCycle { id })
    }

    /// True if the actor is moving and is not its own stack's leader.
    ///
    /// A follower's commands are frozen while this holds.
    pub fn in_transit(&self, id: EntityId) -> Result<bool, TurnError> {
        if !self.entity(id)?.is_moving() {
            return Ok(false);
        }
        Ok(self.leader(id)? != id)
    }

    /// Place the entity's stack currently stands in.
    pub fn place_of(&self, id: EntityId) -> Result<Option<EntityId>, TurnError> {
        let leader = self.leader(id)?;
        Ok(match self.entity(leader)?.location() {
            Some(Location::Place(place)) => Some(place),
            _ => None,
        })
    }

    /// The leader followed by every actor stacked beneath it, depth first in
    /// arrival order.
    pub fn stack_members(&self, leader: EntityId) -> Result<Vec<EntityId>, TurnError> {
        let mut members = Vec::new();
        let mut pending = vec![(leader, 0usize)];
        while let Some((id, depth)) = pending.pop() {
            if depth > self.config.max_stack_depth {
                return Err(TurnError::StackCycle { id: leader });
            }
            members.push(id);
            let entity = self.entity(id)?;
            pending.extend(
                entity
                    .here()
                    .iter()
                    .rev()
                    .filter(|child| self.entities.get(**child).is_some_and(|c| c.kind().can_act()))
                    .map(|child| (*child, depth + 1)),
            );
        }
        Ok(members)
    }

    /// Sets or clears the moving flag on a leader and all of its followers.
    pub fn set_stack_moving(&mut self, leader: EntityId, moving: bool) -> Result<(), TurnError> {
        for id in self.stack_members(leader)? {
            self.entity_mut(id)?.flags.set(EntityFlags::MOVING, moving);
        }
        Ok(())
    }

    /// Puts an entity in a place or under an actor, appending it to the new
    /// parent's here list.
    ///
    /// Rejects targets of the wrong kind and moves that would make an actor
    /// its own ancestor.
    pub fn move_to(&mut self, id: EntityId, target: Location) -> Result<(), TurnError> {
        self.entity(id)?;
        let parent = self.entity(target.id())?;
        let kind_ok = match target {
            Location::Place(_) => parent.kind().is_place(),
            Location::Actor(_) => parent.kind().can_lead(),
        };
        if !kind_ok || target.id() == id {
            return Err(TurnError::InvalidLocation {
                id,
                target: target.id(),
            });
        }
        if let Location::Actor(parent) = target {
            let mut cursor = Some(parent);
            for _ in 0..=self.config.max_stack_depth {
                match cursor {
                    Some(ancestor) if ancestor == id => {
                        return Err(TurnError::InvalidLocation { id, target: parent });
                    }
                    Some(ancestor) => cursor = self.parent(ancestor)?,
                    None => break,
                }
            }
        }

        self.detach(id)?;
        self.entity_mut(target.id())?.here.push(id);
        self.entity_mut(id)?.location = Some(target);
        Ok(())
    }

    /// Removes the entity from its parent's here list and clears its location.
    pub fn detach(&mut self, id: EntityId) -> Result<(), TurnError> {
        let Some(location) = self.entity(id)?.location() else {
            return Ok(());
        };
        if let Some(parent) = self.entities.get_mut(location.id()) {
            parent.here.retain(|child| *child != id);
        }
        self.entity_mut(id)?.location = None;
        Ok(())
    }

    /// Hands an entity's children to whatever holds the entity itself.
    ///
    /// Children left leading their own stack stop moving.
    pub(crate) fn release_children(&mut self, id: EntityId) -> Result<(), TurnError> {
        let entity = self.entity(id)?;
        let children = entity.here().to_vec();
        let location = entity.location();

        for child in children {
            match location {
                Some(target) => self.move_to(child, target)?,
                None => self.detach(child)?,
            }
            if !matches!(location, Some(Location::Actor(_))) {
                self.set_stack_moving(child, false)?;
            }
        }
        Ok(())
    }
}
