//! Hostile actions between units.

use realm_core::{ActionSpec, CommandContext, Kind};

use super::{ActionDef, ArgKind, codes, tier};

pub(super) const DEFS: &[ActionDef] = &[ActionDef {
    spec: ActionSpec {
        code: codes::ATTACK,
        verb: "attack",
        start: Some(start_attack),
        finish: None,
        interrupt: None,
        duration: 0,
        poll: false,
        priority: tier(1),
    },
    args: &[ArgKind::Entity],
    required: 1,
}];

/// Declares hostility towards a unit in the same place. The fight itself is
/// resolved by the next automatic engagement check.
fn start_attack(ctx: &mut CommandContext<'_>) -> bool {
    let actor = ctx.actor();
    let Some(target) = ctx.entity_operand(0) else {
        return false;
    };
    let world = ctx.world();
    if target == actor || !world.entity(target).is_ok_and(|e| e.kind() == Kind::Char) {
        return false;
    }
    if world.owner_of(target).ok() == world.owner_of(actor).ok() {
        return false;
    }
    let here = world.place_of(actor).ok().flatten();
    if here.is_none() || here != world.place_of(target).ok().flatten() {
        return false;
    }

    tracing::debug!(%actor, %target, "attack declared");
    ctx.world_mut().request_engagement_check();
    true
}
