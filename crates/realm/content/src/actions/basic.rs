//! Verbs that involve only the acting unit: stop, wait, study, explore and
//! guard.

use realm_core::{
    ActionSpec, CommandContext, Kind, Location, PcgRng, Priority, RngOracle, Subkind,
    compute_seed,
};

use super::{ActionDef, ArgKind, codes, tier};

const STUDY_DAYS: i32 = 7;
const EXPLORE_DAYS: i32 = 7;
/// One day in this many turns up a hidden place.
const EXPLORE_ODDS: u32 = 4;

pub(super) const DEFS: &[ActionDef] = &[
    ActionDef {
        spec: ActionSpec {
            code: codes::STOP,
            verb: "stop",
            start: None,
            finish: None,
            interrupt: None,
            duration: 0,
            poll: false,
            priority: Priority::URGENT,
        },
        args: &[],
        required: 0,
    },
    ActionDef {
        spec: ActionSpec {
            code: codes::WAIT,
            verb: "wait",
            start: Some(start_wait),
            finish: None,
            interrupt: None,
            duration: 0,
            poll: false,
            priority: tier(3),
        },
        args: &[ArgKind::Number],
        required: 1,
    },
    ActionDef {
        spec: ActionSpec {
            code: codes::STUDY,
            verb: "study",
            start: Some(start_study),
            finish: None,
            interrupt: None,
            duration: STUDY_DAYS,
            poll: false,
            priority: tier(3),
        },
        args: &[ArgKind::Number],
        required: 0,
    },
    ActionDef {
        spec: ActionSpec {
            code: codes::EXPLORE,
            verb: "explore",
            start: Some(start_explore),
            finish: Some(finish_explore),
            interrupt: None,
            duration: EXPLORE_DAYS,
            poll: true,
            priority: tier(3),
        },
        args: &[],
        required: 0,
    },
    ActionDef {
        spec: ActionSpec {
            code: codes::GUARD,
            verb: "guard",
            start: None,
            finish: Some(finish_guard),
            interrupt: None,
            duration: 1,
            poll: true,
            priority: tier(4),
        },
        args: &[],
        required: 0,
    },
];

fn days_operand(ctx: &CommandContext<'_>) -> Option<i32> {
    ctx.number_operand(0).map(|n| i32::try_from(n).unwrap_or(i32::MAX))
}

/// `wait N`: idles for N days. `wait 0` completes immediately.
fn start_wait(ctx: &mut CommandContext<'_>) -> bool {
    match days_operand(ctx) {
        Some(days) if days >= 0 => {
            ctx.set_wait(days);
            true
        }
        _ => false,
    }
}

/// `study [N]`: N days of study, a week if omitted.
fn start_study(ctx: &mut CommandContext<'_>) -> bool {
    match days_operand(ctx) {
        None => true,
        Some(days) if days > 0 => {
            ctx.set_wait(days);
            true
        }
        Some(_) => false,
    }
}

fn start_explore(ctx: &mut CommandContext<'_>) -> bool {
    ctx.world().place_of(ctx.actor()).is_ok_and(|place| place.is_some())
}

/// Rolls once per day. A hit creates a hidden mine in the explorer's place
/// and ends the command; running out of days fails it.
fn finish_explore(ctx: &mut CommandContext<'_>) -> bool {
    let actor = ctx.actor();
    let world = ctx.world();
    let Ok(Some(place)) = world.place_of(actor) else {
        return false;
    };
    let nonce = (u64::from(world.calendar.turn) << 16) | u64::from(world.calendar.day);
    let roll = PcgRng.range(compute_seed(world.seed(), nonce, actor.0), 1, EXPLORE_ODDS);

    if roll == 1 {
        let world = ctx.world_mut();
        let found = world
            .create_entity(Kind::Loc, Subkind::Mine)
            .and_then(|mine| world.move_to(mine, Location::Place(place)).map(|()| mine));
        return match found {
            Ok(mine) => {
                tracing::debug!(%actor, %place, %mine, "explore found a hidden place");
                ctx.set_wait(0);
                true
            }
            Err(error) => {
                tracing::warn!(%actor, %error, "explore could not record its find");
                false
            }
        };
    }

    ctx.command().is_some_and(|command| command.wait > 0)
}

/// Holds position indefinitely, standing down as soon as the unit has
/// another order waiting.
fn finish_guard(ctx: &mut CommandContext<'_>) -> bool {
    let actor = ctx.actor();
    let world = ctx.world();
    let Ok(owner) = world.owner_of(actor) else {
        return false;
    };
    if world.orders.count(owner, actor) > 0 {
        ctx.set_wait(0);
    } else {
        ctx.set_wait(1);
    }
    true
}
