//! Pending order text, filed per controlling player and per actor.

use std::collections::{BTreeMap, VecDeque};

use thiserror::Error;

use crate::error::{ErrorSeverity, RealmError};
use crate::state::EntityId;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum OrderError {
    #[error("order queue for {actor} (owner {owner}) is full ({limit} orders)")]
    QueueFull {
        owner: EntityId,
        actor: EntityId,
        limit: usize,
    },

    #[error("cannot file orders for unknown actor {actor}")]
    UnknownActor { actor: EntityId },
}

impl RealmError for OrderError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::QueueFull { .. } => "ORDER_QUEUE_FULL",
            Self::UnknownActor { .. } => "ORDER_UNKNOWN_ACTOR",
        }
    }
}

/// FIFO queues of raw order text keyed by `(owner, actor)`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OrderBook {
    queues: BTreeMap<EntityId, BTreeMap<EntityId, VecDeque<String>>>,
    limit: usize,
}

impl OrderBook {
    pub fn new(limit: usize) -> Self {
        Self {
            queues: BTreeMap::new(),
            limit,
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    fn queue(&self, owner: EntityId, actor: EntityId) -> Option<&VecDeque<String>> {
        self.queues.get(&owner)?.get(&actor)
    }

    pub fn peek(&self, owner: EntityId, actor: EntityId) -> Option<&str> {
        self.queue(owner, actor)?.front().map(String::as_str)
    }

    pub fn pop(&mut self, owner: EntityId, actor: EntityId) -> Option<String> {
        let per_owner = self.queues.get_mut(&owner)?;
        let queue = per_owner.get_mut(&actor)?;
        let text = queue.pop_front();
        if queue.is_empty() {
            per_owner.remove(&actor);
            if per_owner.is_empty() {
                self.queues.remove(&owner);
            }
        }
        text
    }

    /// Appends an order, rejecting it once the queue holds `limit` entries.
    pub fn push(
        &mut self,
        owner: EntityId,
        actor: EntityId,
        text: impl Into<String>,
    ) -> Result<(), OrderError> {
        if self.count(owner, actor) >= self.limit {
            return Err(OrderError::QueueFull {
                owner,
                actor,
                limit: self.limit,
            });
        }
        self.entry(owner, actor).push_back(text.into());
        Ok(())
    }

    /// Puts an order at the front of the queue. Never rejected, so a forced
    /// stop always gets through.
    pub fn push_front(&mut self, owner: EntityId, actor: EntityId, text: impl Into<String>) {
        self.entry(owner, actor).push_front(text.into());
    }

    pub fn count(&self, owner: EntityId, actor: EntityId) -> usize {
        self.queue(owner, actor).map_or(0, VecDeque::len)
    }

    /// Drops every pending order for the actor.
    pub fn clear(&mut self, owner: EntityId, actor: EntityId) {
        if let Some(per_owner) = self.queues.get_mut(&owner) {
            per_owner.remove(&actor);
            if per_owner.is_empty() {
                self.queues.remove(&owner);
            }
        }
    }

    /// Pending orders of one actor, front first.
    pub fn iter(&self, owner: EntityId, actor: EntityId) -> impl Iterator<Item = &str> {
        self.queue(owner, actor)
            .into_iter()
            .flat_map(|queue| queue.iter().map(String::as_str))
    }

    /// Total number of pending orders across all queues.
    pub fn total(&self) -> usize {
        self.queues
            .values()
            .flat_map(BTreeMap::values)
            .map(VecDeque::len)
            .sum()
    }

    fn entry(&mut self, owner: EntityId, actor: EntityId) -> &mut VecDeque<String> {
        self.queues.entry(owner).or_default().entry(actor).or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OWNER: EntityId = EntityId(1001);
    const ACTOR: EntityId = EntityId(5001);

    #[test]
    fn fifo_with_forced_front() {
        let mut book = OrderBook::new(10);
        book.push(OWNER, ACTOR, "wait 2").unwrap();
        book.push(OWNER, ACTOR, "study 3").unwrap();
        book.push_front(OWNER, ACTOR, "stop");

        assert_eq!(book.count(OWNER, ACTOR), 3);
        assert_eq!(book.peek(OWNER, ACTOR), Some("stop"));
        assert_eq!(book.pop(OWNER, ACTOR).as_deref(), Some("stop"));
        assert_eq!(book.pop(OWNER, ACTOR).as_deref(), Some("wait 2"));
        assert_eq!(book.pop(OWNER, ACTOR).as_deref(), Some("study 3"));
        assert_eq!(book.pop(OWNER, ACTOR), None);
        assert_eq!(book.total(), 0);
    }

    #[test]
    fn push_beyond_limit_is_rejected() {
        let mut book = OrderBook::new(2);
        book.push(OWNER, ACTOR, "wait 1").unwrap();
        book.push(OWNER, ACTOR, "wait 1").unwrap();

        let err = book.push(OWNER, ACTOR, "wait 1").unwrap_err();
        assert_eq!(err.error_code(), "ORDER_QUEUE_FULL");
        assert_eq!(err.severity(), ErrorSeverity::Validation);

        book.push_front(OWNER, ACTOR, "stop");
        assert_eq!(book.count(OWNER, ACTOR), 3);
    }

    #[test]
    fn queues_are_separate_per_owner() {
        let mut book = OrderBook::new(5);
        book.push(OWNER, ACTOR, "guard").unwrap();
        book.push(EntityId(1002), ACTOR, "explore").unwrap();

        assert_eq!(book.peek(OWNER, ACTOR), Some("guard"));
        assert_eq!(book.peek(EntityId(1002), ACTOR), Some("explore"));

        book.clear(OWNER, ACTOR);
        assert_eq!(book.count(OWNER, ACTOR), 0);
        assert_eq!(book.total(), 1);
    }
}
