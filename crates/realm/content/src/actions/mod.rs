//! Built-in action table.
//!
//! Every order verb the world understands out of the box is declared here
//! together with its operand syntax, so the parser and the handler table are
//! always built from the same definitions.

mod basic;
mod combat;
mod movement;

use std::collections::BTreeMap;

use realm_core::{ActionCode, ActionSpec, HandlerTable, Priority};

/// Action codes of the built-in verbs.
pub mod codes {
    use realm_core::ActionCode;

    pub const STOP: ActionCode = ActionCode(0);
    pub const WAIT: ActionCode = ActionCode(1);
    pub const MOVE: ActionCode = ActionCode(2);
    pub const STACK: ActionCode = ActionCode(3);
    pub const UNSTACK: ActionCode = ActionCode(4);
    pub const STUDY: ActionCode = ActionCode(5);
    pub const EXPLORE: ActionCode = ActionCode(6);
    pub const GUARD: ActionCode = ActionCode(7);
    pub const ATTACK: ActionCode = ActionCode(8);
}

/// Shape of a single order argument.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArgKind {
    /// A live entity, written `5001` or `#5001`.
    Entity,
    Number,
    Word,
}

/// Handler metadata plus the operand syntax the parser enforces.
#[derive(Clone, Copy, Debug)]
pub struct ActionDef {
    pub spec: ActionSpec,
    pub args: &'static [ArgKind],
    /// Leading arguments that must be present.
    pub required: usize,
}

pub(crate) const fn tier(value: u8) -> Priority {
    match Priority::new(value) {
        Some(priority) => priority,
        None => Priority::LOWEST,
    }
}

/// Action code → definition lookup.
#[derive(Clone, Debug, Default)]
pub struct ActionTable {
    defs: BTreeMap<ActionCode, ActionDef>,
}

impl ActionTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Table with every built-in verb registered.
    pub fn builtin() -> Self {
        let mut table = Self::new();
        for def in basic::DEFS.iter().chain(movement::DEFS).chain(combat::DEFS) {
            table.register(*def);
        }
        table
    }

    /// Adds or replaces a definition, returning the one it displaced.
    pub fn register(&mut self, def: ActionDef) -> Option<ActionDef> {
        self.defs.insert(def.spec.code, def)
    }

    pub fn get(&self, code: ActionCode) -> Option<&ActionDef> {
        self.defs.get(&code)
    }

    pub fn by_verb(&self, verb: &str) -> Option<&ActionDef> {
        self.defs
            .values()
            .find(|def| def.spec.verb.eq_ignore_ascii_case(verb))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActionDef> {
        self.defs.values()
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}

impl HandlerTable for ActionTable {
    fn spec(&self, code: ActionCode) -> Option<&ActionSpec> {
        self.defs.get(&code).map(|def| &def.spec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use realm_core::RealmConfig;

    #[test]
    fn builtin_verbs_are_unique_and_fit_operand_storage() {
        let table = ActionTable::builtin();
        assert_eq!(table.len(), 9);

        let mut verbs: Vec<_> = table.iter().map(|def| def.spec.verb).collect();
        verbs.sort_unstable();
        verbs.dedup();
        assert_eq!(verbs.len(), table.len());

        for def in table.iter() {
            assert!(def.args.len() <= RealmConfig::MAX_OPERANDS, "{}", def.spec.verb);
            assert!(def.required <= def.args.len(), "{}", def.spec.verb);
        }
    }

    #[test]
    fn builtin_priorities_match_their_urgency() {
        let table = ActionTable::builtin();
        let priority = |verb| table.by_verb(verb).map(|def| def.spec.priority.get());

        assert_eq!(priority("stop"), Some(0));
        assert_eq!(priority("stack"), Some(1));
        assert_eq!(priority("unstack"), Some(1));
        assert_eq!(priority("attack"), Some(1));
        assert_eq!(priority("move"), Some(2));
        assert_eq!(priority("wait"), Some(3));
        assert_eq!(priority("study"), Some(3));
        assert_eq!(priority("explore"), Some(3));
        assert_eq!(priority("guard"), Some(4));
    }

    #[test]
    fn verb_lookup_ignores_case() {
        let table = ActionTable::builtin();
        assert_eq!(
            table.by_verb("MOVE").map(|def| def.spec.code),
            Some(codes::MOVE)
        );
        assert!(table.by_verb("teleport").is_none());
    }
}
