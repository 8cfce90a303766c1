//! Whitespace-separated order text parser.
//!
//! An order is a verb followed by its arguments, e.g. `move 11020` or
//! `stack #5003`. Verbs are case-insensitive. Entity arguments must name a
//! live entity at parse time; whether it is the right *kind* of entity is
//! left to the handler's start routine.

use std::collections::BTreeMap;

use realm_core::{
    EntityId, Operand, Operands, OrderParser, ParseError, ParsedOrder, World,
};

use crate::actions::{ActionDef, ActionTable, ArgKind};

/// Parser built from an action table's operand syntax.
#[derive(Clone, Debug)]
pub struct TextOrderParser {
    verbs: BTreeMap<String, ActionDef>,
}

impl TextOrderParser {
    pub fn new(table: &ActionTable) -> Self {
        let verbs = table
            .iter()
            .map(|def| (def.spec.verb.to_ascii_lowercase(), *def))
            .collect();
        Self { verbs }
    }

    pub fn knows(&self, verb: &str) -> bool {
        self.verbs.contains_key(&verb.to_ascii_lowercase())
    }
}

impl Default for TextOrderParser {
    fn default() -> Self {
        Self::new(&ActionTable::builtin())
    }
}

impl OrderParser for TextOrderParser {
    fn parse(&self, world: &World, _actor: EntityId, text: &str) -> Result<ParsedOrder, ParseError> {
        let mut words = text.split_whitespace();
        let verb = words.next().ok_or(ParseError::Empty)?;
        let def = self
            .verbs
            .get(&verb.to_ascii_lowercase())
            .ok_or_else(|| ParseError::UnknownVerb {
                verb: verb.to_string(),
            })?;
        let args: Vec<&str> = words.collect();

        if args.len() < def.required {
            return Err(ParseError::MissingOperand {
                verb: def.spec.verb.to_string(),
                expected: def.required,
                found: args.len(),
            });
        }
        if args.len() > def.args.len() {
            return Err(ParseError::TooManyOperands {
                verb: def.spec.verb.to_string(),
                max: def.args.len(),
            });
        }

        let mut operands = Operands::new();
        for (index, (word, kind)) in args.iter().zip(def.args).enumerate() {
            let operand = decode(world, *kind, word).ok_or_else(|| ParseError::BadOperand {
                verb: def.spec.verb.to_string(),
                position: index + 1,
                text: (*word).to_string(),
            })?;
            operands
                .try_push(operand)
                .map_err(|_| ParseError::TooManyOperands {
                    verb: def.spec.verb.to_string(),
                    max: operands.capacity(),
                })?;
        }

        Ok(ParsedOrder {
            code: def.spec.code,
            operands,
        })
    }
}

fn decode(world: &World, kind: ArgKind, word: &str) -> Option<Operand> {
    match kind {
        ArgKind::Entity => {
            let id = EntityId(word.strip_prefix('#').unwrap_or(word).parse().ok()?);
            world.entities.contains(id).then_some(Operand::Entity(id))
        }
        ArgKind::Number => word.parse().ok().map(Operand::Number),
        ArgKind::Word => Some(Operand::Word(word.to_string())),
    }
}
