use strum::{EnumCount, EnumIter, IntoStaticStr};

/// Top-level entity category.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, EnumCount, EnumIter, IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Kind {
    Player,
    Char,
    Loc,
    Item,
    Ship,
    Skill,
    Gate,
    Unform,
    Deleted,
}

impl Kind {
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Entities of this kind may hold a command.
    #[inline]
    pub const fn can_act(self) -> bool {
        matches!(self, Kind::Player | Kind::Char)
    }

    /// Entities of this kind are valid stacking parents.
    #[inline]
    pub const fn can_lead(self) -> bool {
        matches!(self, Kind::Char)
    }

    /// Entities of this kind are places an actor can stand in.
    #[inline]
    pub const fn is_place(self) -> bool {
        matches!(self, Kind::Loc | Kind::Ship)
    }

    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// Second-level entity category.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, EnumCount, EnumIter, IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Subkind {
    None,
    Region,
    Province,
    Ocean,
    Island,
    Forest,
    Mountain,
    Swamp,
    Desert,
    Plain,
    City,
    Castle,
    Tower,
    Inn,
    Mine,
    Temple,
    Galley,
    Roundship,
    Pc,
    Npc,
    Garrison,
    Deadchar,
}

impl Subkind {
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        self.into()
    }
}
