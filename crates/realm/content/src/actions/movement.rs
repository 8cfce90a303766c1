//! Travel and stacking verbs.

use realm_core::{ActionSpec, CommandContext, EntityId, Location};

use super::{ActionDef, ArgKind, codes, tier};

/// Days a stack spends on the road between two places.
const TRAVEL_DAYS: i32 = 3;

pub(super) const DEFS: &[ActionDef] = &[
    ActionDef {
        spec: ActionSpec {
            code: codes::MOVE,
            verb: "move",
            start: Some(start_move),
            finish: Some(finish_move),
            interrupt: Some(halt_move),
            duration: TRAVEL_DAYS,
            poll: false,
            priority: tier(2),
        },
        args: &[ArgKind::Entity],
        required: 1,
    },
    ActionDef {
        spec: ActionSpec {
            code: codes::STACK,
            verb: "stack",
            start: Some(start_stack),
            finish: None,
            interrupt: None,
            duration: 0,
            poll: false,
            priority: tier(1),
        },
        args: &[ArgKind::Entity],
        required: 1,
    },
    ActionDef {
        spec: ActionSpec {
            code: codes::UNSTACK,
            verb: "unstack",
            start: Some(start_unstack),
            finish: None,
            interrupt: None,
            duration: 0,
            poll: false,
            priority: tier(1),
        },
        args: &[],
        required: 0,
    },
];

fn destination(ctx: &CommandContext<'_>) -> Option<EntityId> {
    let target = ctx.entity_operand(0)?;
    ctx.world()
        .entity(target)
        .is_ok_and(|entity| entity.kind().is_place())
        .then_some(target)
}

/// Only a stack leader may set out; the whole stack starts moving with it.
fn start_move(ctx: &mut CommandContext<'_>) -> bool {
    let actor = ctx.actor();
    let Some(target) = destination(ctx) else {
        return false;
    };
    let world = ctx.world();
    if world.leader(actor).ok() != Some(actor) {
        return false;
    }
    if world.place_of(actor).ok().flatten() == Some(target) {
        return false;
    }
    ctx.world_mut().set_stack_moving(actor, true).is_ok()
}

/// Arrival: the leader steps into the destination, taking its followers.
fn finish_move(ctx: &mut CommandContext<'_>) -> bool {
    let actor = ctx.actor();
    let Some(target) = destination(ctx) else {
        halt_move(ctx);
        return false;
    };
    let arrived = ctx.world_mut().move_to(actor, Location::Place(target));
    halt_move(ctx);
    match arrived {
        Ok(()) => {
            tracing::debug!(%actor, to = %target, "stack arrived");
            true
        }
        Err(error) => {
            tracing::warn!(%actor, %error, "arrival rejected");
            false
        }
    }
}

fn halt_move(ctx: &mut CommandContext<'_>) -> bool {
    let actor = ctx.actor();
    ctx.world_mut().set_stack_moving(actor, false).is_ok()
}

/// `stack <unit>`: join another unit standing in the same place.
fn start_stack(ctx: &mut CommandContext<'_>) -> bool {
    let actor = ctx.actor();
    let Some(target) = ctx.entity_operand(0) else {
        return false;
    };
    let world = ctx.world();
    let Ok(leader) = world.entity(target) else {
        return false;
    };
    if target == actor || !leader.kind().can_lead() || leader.is_moving() {
        return false;
    }
    if world.entity(actor).is_ok_and(|entity| entity.is_moving()) {
        return false;
    }
    let here = world.place_of(actor).ok().flatten();
    if here.is_none() || here != world.place_of(target).ok().flatten() {
        return false;
    }
    ctx.world_mut().move_to(actor, Location::Actor(target)).is_ok()
}

/// `unstack`: leave the current leader and stand alone in its place.
fn start_unstack(ctx: &mut CommandContext<'_>) -> bool {
    let actor = ctx.actor();
    let world = ctx.world();
    if !matches!(world.parent(actor), Ok(Some(_))) {
        return false;
    }
    let Ok(Some(place)) = world.place_of(actor) else {
        return false;
    };
    ctx.world_mut().move_to(actor, Location::Place(place)).is_ok()
}
