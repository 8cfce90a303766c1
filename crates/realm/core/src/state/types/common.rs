use std::fmt;

/// Unique identifier for any entity tracked in the world.
///
/// IDs index a sparse table; `0` is never allocated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityId(pub u32);

impl EntityId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u32> for EntityId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

/// Position of the world on the turn/day calendar.
///
/// A turn is processed as days `1..=month_days`; `day == 0` means the turn
/// has been set up but no day has been advanced yet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Calendar {
    pub turn: u32,
    pub day: u32,
    /// Set once every day of `turn` has been processed.
    pub days_complete: bool,
}

impl Calendar {
    pub const fn new() -> Self {
        Self {
            turn: 0,
            day: 0,
            days_complete: false,
        }
    }

    /// Resets the day counter for a new turn.
    pub fn begin_turn(&mut self, turn: u32) {
        self.turn = turn;
        self.day = 0;
        self.days_complete = false;
    }

    /// Advances by one day and returns the new day number.
    pub fn advance_day(&mut self) -> u32 {
        self.day += 1;
        self.day
    }
}

impl fmt::Display for Calendar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "turn {} day {}", self.turn, self.day)
    }
}
