use bitflags::bitflags;

use crate::command::Command;
use crate::state::{EntityId, Kind, Subkind};

bitflags! {
    /// Payload flags the scheduler consults.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct EntityFlags: u8 {
        /// Held captive; a prisoner's queued command is never selected.
        const PRISONER = 1 << 0;
        /// Travelling between places.
        const MOVING = 1 << 1;
    }
}

/// Where an entity currently is.
///
/// An actor either stands directly in a place or is stacked under another
/// actor. The variant is checked against the target's kind when set, so a
/// place ID can never be mistaken for a stacking parent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Location {
    Place(EntityId),
    Actor(EntityId),
}

impl Location {
    pub const fn id(self) -> EntityId {
        match self {
            Location::Place(id) | Location::Actor(id) => id,
        }
    }
}

/// One slot of the entity table.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Entity {
    id: EntityId,
    kind: Kind,
    subkind: Subkind,
    pub flags: EntityFlags,
    /// Controlling player; orders for this entity are filed under it.
    pub owner: Option<EntityId>,
    pub(crate) location: Option<Location>,
    /// Direct children in arrival order.
    pub(crate) here: Vec<EntityId>,
    /// Current command, created lazily the first time the actor needs one.
    pub command: Option<Command>,
    pub(crate) next_kind: Option<EntityId>,
    pub(crate) next_subkind: Option<EntityId>,
}

impl Entity {
    pub(crate) fn new(id: EntityId, kind: Kind, subkind: Subkind) -> Self {
        Self {
            id,
            kind,
            subkind,
            flags: EntityFlags::empty(),
            owner: None,
            location: None,
            here: Vec::new(),
            command: None,
            next_kind: None,
            next_subkind: None,
        }
    }

    #[inline]
    pub fn id(&self) -> EntityId {
        self.id
    }

    #[inline]
    pub fn kind(&self) -> Kind {
        self.kind
    }

    #[inline]
    pub fn subkind(&self) -> Subkind {
        self.subkind
    }

    #[inline]
    pub fn location(&self) -> Option<Location> {
        self.location
    }

    /// Direct children in arrival order.
    #[inline]
    pub fn here(&self) -> &[EntityId] {
        &self.here
    }

    #[inline]
    pub fn is_deleted(&self) -> bool {
        self.kind == Kind::Deleted
    }

    #[inline]
    pub fn is_prisoner(&self) -> bool {
        self.flags.contains(EntityFlags::PRISONER)
    }

    #[inline]
    pub fn is_moving(&self) -> bool {
        self.flags.contains(EntityFlags::MOVING)
    }

    pub(crate) fn set_kind(&mut self, kind: Kind) {
        self.kind = kind;
    }

    pub(crate) fn set_subkind(&mut self, subkind: Subkind) {
        self.subkind = subkind;
    }
}
