use crate::command::{Outcome, Priority};
use crate::state::EntityId;

/// What happened to a command, in the order it happened.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CommandEventKind {
    Queued { priority: Priority },
    ParseFailed { text: String, reason: String },
    Started,
    Completed { outcome: Outcome, days: u32 },
    Interrupted,
    /// Draining of `from` stopped because `to` became ready.
    Preempted { from: Priority, to: Priority },
    EngagementCheck,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CommandEvent {
    pub day: u32,
    /// `None` for scheduler-level events.
    pub actor: Option<EntityId>,
    pub kind: CommandEventKind,
}

/// Ordered log of one processed turn.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TurnReport {
    pub turn: u32,
    pub events: Vec<CommandEvent>,
}

impl TurnReport {
    pub fn new(turn: u32) -> Self {
        Self {
            turn,
            events: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, day: u32, actor: Option<EntityId>, kind: CommandEventKind) {
        self.events.push(CommandEvent { day, actor, kind });
    }

    /// Actors in the order their commands were started.
    pub fn start_order(&self) -> Vec<EntityId> {
        self.events
            .iter()
            .filter(|e| e.kind == CommandEventKind::Started)
            .filter_map(|e| e.actor)
            .collect()
    }

    /// Events concerning one actor.
    pub fn for_actor(&self, actor: EntityId) -> impl Iterator<Item = &CommandEvent> {
        self.events.iter().filter(move |e| e.actor == Some(actor))
    }

    pub fn completions(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e.kind, CommandEventKind::Completed { .. }))
            .count()
    }
}
