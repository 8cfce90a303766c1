//! Default orders for idle, unowned characters.

use realm_core::{Kind, TurnEngine, TurnError};

use super::{HookPhase, TurnHook};

/// Gives idle, unowned characters a default order so they are never left
/// without something to do.
pub struct StandingOrderHook {
    order: String,
}

impl StandingOrderHook {
    pub fn new(order: impl Into<String>) -> Self {
        Self {
            order: order.into(),
        }
    }

    pub fn order(&self) -> &str {
        &self.order
    }
}

impl Default for StandingOrderHook {
    fn default() -> Self {
        Self::new("guard")
    }
}

impl TurnHook for StandingOrderHook {
    fn name(&self) -> &'static str {
        "standing_orders"
    }

    fn phase(&self) -> HookPhase {
        HookPhase::StandingOrders
    }

    fn run(&self, engine: &mut TurnEngine<'_>) -> Result<(), TurnError> {
        let world = engine.world();
        let idle: Vec<_> = world
            .entities
            .iter_kind(Kind::Char)
            .filter(|&id| {
                world.entities.get(id).is_some_and(|entity| {
                    entity.owner.is_none()
                        && !entity.is_prisoner()
                        && entity.command.as_ref().is_none_or(|c| c.is_idle())
                })
            })
            .filter(|&id| world.orders.count(id, id) == 0)
            .collect();

        for actor in idle {
            if let Err(error) = engine.world_mut().queue_order(actor, self.order.as_str()) {
                tracing::warn!(target: "runtime::hooks", %actor, %error, "standing order rejected");
                continue;
            }
            engine.load_next(actor)?;
        }
        Ok(())
    }
}
