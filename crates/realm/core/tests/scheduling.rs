use std::sync::atomic::{AtomicUsize, Ordering};

use realm_core::{
    ActionCode, ActionSpec, CommandContext, CommandEventKind, CommandState, EntityFlags, EntityId,
    HandlerTable, Kind, Location, Operand, Operands, OrderParser, Outcome, ParseError,
    ParsedOrder, Priority, RealmConfig, Routine, Slot, Subkind, TurnEngine, TurnEnv, TurnError, TurnHooks,
    World,
};

const PLAYER: EntityId = EntityId(1001);
const CITY: EntityId = EntityId(50_001);

const STOP: ActionCode = ActionCode(0);
const FAIL: ActionCode = ActionCode(20);
const MARCH: ActionCode = ActionCode(30);
const QUIET: ActionCode = ActionCode(40);
const UNTIL: ActionCode = ActionCode(41);
const GHOST: ActionCode = ActionCode(99);

fn p(tier: u8) -> Priority {
    Priority::new(tier).unwrap()
}

// ----------------------------------------------------------------------------
// Test collaborators
// ----------------------------------------------------------------------------

/// `p<tier> [days]`, `fail`, `march <days>`, `quiet <days> [hush]`,
/// `until <day>`, `stop`; `ghost` parses to an action nobody handles.
struct WordParser;

impl OrderParser for WordParser {
    fn parse(&self, _world: &World, _actor: EntityId, text: &str) -> Result<ParsedOrder, ParseError> {
        let mut words = text.split_whitespace();
        let verb = words.next().ok_or(ParseError::Empty)?;
        let code = match verb {
            "p0" | "p1" | "p2" | "p3" | "p4" => ActionCode(10 + u16::from(verb.as_bytes()[1] - b'0')),
            "stop" => STOP,
            "fail" => FAIL,
            "march" => MARCH,
            "quiet" => QUIET,
            "until" => UNTIL,
            "ghost" => GHOST,
            other => {
                return Err(ParseError::UnknownVerb {
                    verb: other.to_string(),
                });
            }
        };

        let mut operands = Operands::new();
        for (position, word) in words.enumerate() {
            let number = word.parse().map_err(|_| ParseError::BadOperand {
                verb: verb.to_string(),
                position,
                text: word.to_string(),
            })?;
            operands.push(Operand::Number(number));
        }
        Ok(ParsedOrder { code, operands })
    }
}

fn wait_from_operand(ctx: &mut CommandContext<'_>) -> bool {
    let days = ctx.number_operand(0).unwrap_or(0);
    ctx.set_wait(days as i32);
    true
}

fn succeed(_ctx: &mut CommandContext<'_>) -> bool {
    true
}

fn refuse(_ctx: &mut CommandContext<'_>) -> bool {
    false
}

fn begin_march(ctx: &mut CommandContext<'_>) -> bool {
    let actor = ctx.actor();
    ctx.world_mut().set_stack_moving(actor, true).is_ok() && wait_from_operand(ctx)
}

fn end_march(ctx: &mut CommandContext<'_>) -> bool {
    let actor = ctx.actor();
    ctx.world_mut().set_stack_moving(actor, false).is_ok()
}

static QUIET_FINISHES: AtomicUsize = AtomicUsize::new(0);

/// Any operand after the day count suppresses the finish routine.
fn begin_quiet(ctx: &mut CommandContext<'_>) -> bool {
    let days = match ctx.operands().first() {
        Some(Operand::Number(days)) => *days as i32,
        _ => 0,
    };
    let hushed = ctx.operands().len() > 1;
    ctx.set_wait(days);
    if hushed {
        ctx.inhibit_finish();
    }
    true
}

fn count_quiet_finish(_ctx: &mut CommandContext<'_>) -> bool {
    QUIET_FINISHES.fetch_add(1, Ordering::SeqCst);
    true
}

fn wait_until_day(ctx: &mut CommandContext<'_>) -> bool {
    let target = ctx.number_operand(0).unwrap_or(0);
    let today = i64::from(ctx.current_day());
    if target <= today {
        return false;
    }
    ctx.set_wait((target - today) as i32);
    true
}

struct Table(Vec<ActionSpec>);

impl HandlerTable for Table {
    fn spec(&self, code: ActionCode) -> Option<&ActionSpec> {
        self.0.iter().find(|spec| spec.code == code)
    }
}

fn table() -> Table {
    let spec = |code, priority, start, finish| ActionSpec {
        code,
        verb: "test",
        start,
        finish,
        interrupt: Some(end_march as Routine),
        duration: 0,
        poll: false,
        priority,
    };

    let mut specs: Vec<ActionSpec> = (0..5u8)
        .map(|t| {
            spec(
                ActionCode(10 + u16::from(t)),
                p(t),
                Some(wait_from_operand as Routine),
                Some(succeed as Routine),
            )
        })
        .collect();
    specs.push(spec(STOP, p(0), None, None));
    specs.push(spec(FAIL, p(1), Some(refuse), Some(succeed)));
    specs.push(spec(MARCH, p(2), Some(begin_march), Some(end_march)));
    specs.push(spec(QUIET, p(2), Some(begin_quiet), Some(count_quiet_finish)));
    specs.push(spec(UNTIL, p(2), Some(wait_until_day), Some(succeed)));
    Table(specs)
}

/// Counts engagement checks and optionally fails consistency.
#[derive(Default)]
struct CountingHooks {
    engagements: AtomicUsize,
    failures: AtomicUsize,
    break_consistency: bool,
}

impl TurnHooks for CountingHooks {
    fn check_consistency(&self, _engine: &mut TurnEngine<'_>) -> Result<(), TurnError> {
        if self.break_consistency {
            return Err(TurnError::ChainCorrupted {
                id: CITY,
                reason: "forced by test",
            });
        }
        Ok(())
    }

    fn check_engagements(&self, _engine: &mut TurnEngine<'_>) -> Result<(), TurnError> {
        self.engagements.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn report_failure(&self, _world: &World, _actor: EntityId, _text: &str, _error: &ParseError) {
        self.failures.fetch_add(1, Ordering::SeqCst);
    }
}

// ----------------------------------------------------------------------------
// Fixture helpers
// ----------------------------------------------------------------------------

fn world_with(actors: &[u32]) -> World {
    let mut world = World::new(RealmConfig::default(), 7);
    world.insert_entity(PLAYER, Kind::Player, Subkind::Pc).unwrap();
    world.insert_entity(CITY, Kind::Loc, Subkind::City).unwrap();
    for &id in actors {
        world
            .insert_entity(EntityId(id), Kind::Char, Subkind::Pc)
            .unwrap()
            .owner = Some(PLAYER);
        world.move_to(EntityId(id), Location::Place(CITY)).unwrap();
    }
    world
}

fn order(world: &mut World, actor: u32, texts: &[&str]) {
    for text in texts {
        world.queue_order(EntityId(actor), *text).unwrap();
    }
}

fn state(engine: &TurnEngine<'_>, actor: u32) -> CommandState {
    engine
        .world()
        .command(EntityId(actor))
        .map(|c| c.state)
        .unwrap_or_default()
}

fn wait(engine: &TurnEngine<'_>, actor: u32) -> i32 {
    engine.world().command(EntityId(actor)).unwrap().wait
}

fn starts_on(engine: &TurnEngine<'_>, day: u32) -> Vec<u32> {
    engine
        .report()
        .events
        .iter()
        .filter(|e| e.day == day && e.kind == CommandEventKind::Started)
        .filter_map(|e| e.actor.map(|a| a.0))
        .collect()
}

fn run_until(engine: &mut TurnEngine<'_>, last_day: u32) {
    while engine.world().calendar.day < last_day {
        engine.run_day().unwrap();
    }
}

/// Every actor sits in the slot its command state implies and nowhere else.
fn assert_slots_consistent(world: &World) {
    let scheduler = world.scheduler();
    assert_eq!(scheduler.find_duplicate(), None);
    for actor in world.actors() {
        let Some(command) = world.command(actor) else {
            continue;
        };
        let expected = match command.state {
            CommandState::Queued => Some(Slot::Bin(command.priority)),
            CommandState::Active => Some(Slot::Running),
            CommandState::Idle | CommandState::Failed => None,
        };
        assert_eq!(scheduler.slot_of(actor), expected, "actor {actor}");
    }
}

// ----------------------------------------------------------------------------
// Priority ordering and preemption
// ----------------------------------------------------------------------------

#[test]
fn urgent_actor_dispatches_first_on_the_same_day() {
    let mut world = world_with(&[5001, 5002]);
    let (parser, table) = (WordParser, table());
    let mut engine = TurnEngine::new(&mut world, TurnEnv::without_hooks(&parser, &table));
    engine.begin_turn(1).unwrap();
    run_until(&mut engine, 4);

    order(engine.world_mut(), 5001, &["p2"]);
    order(engine.world_mut(), 5002, &["p0"]);
    engine.load_next(EntityId(5001)).unwrap();
    engine.load_next(EntityId(5002)).unwrap();
    engine.run_day().unwrap();

    assert_eq!(starts_on(&engine, 5), vec![5002, 5001]);
}

#[test]
fn newly_ready_urgent_command_preempts_the_drain() {
    let mut world = world_with(&[5001, 5002]);
    order(&mut world, 5001, &["p3", "p0"]);
    order(&mut world, 5002, &["p3"]);
    let (parser, table) = (WordParser, table());
    let mut engine = TurnEngine::new(&mut world, TurnEnv::without_hooks(&parser, &table));

    engine.begin_turn(1).unwrap();
    engine.run_day().unwrap();

    assert_eq!(starts_on(&engine, 1), vec![5001, 5001, 5002]);
    assert!(engine.report().events.iter().any(|e| e.kind
        == CommandEventKind::Preempted {
            from: p(3),
            to: p(0)
        }));
}

#[test]
fn select_next_tier_is_idempotent() {
    let mut world = world_with(&[5001, 5002, 5003]);
    order(&mut world, 5001, &["p4"]);
    order(&mut world, 5002, &["p1"]);
    order(&mut world, 5003, &["p3"]);
    let (parser, table) = (WordParser, table());
    let mut engine = TurnEngine::new(&mut world, TurnEnv::without_hooks(&parser, &table));
    engine.begin_turn(1).unwrap();

    let first = engine.select_next_tier().unwrap();
    let second = engine.select_next_tier().unwrap();
    assert_eq!(first, Some(p(1)));
    assert_eq!(first, second);
}

#[test]
fn prisoner_in_nonempty_bin_is_not_ready() {
    let mut world = world_with(&[5004]);
    order(&mut world, 5004, &["p1"]);
    world.entity_mut(EntityId(5004)).unwrap().flags |= EntityFlags::PRISONER;
    let (parser, table) = (WordParser, table());
    let mut engine = TurnEngine::new(&mut world, TurnEnv::without_hooks(&parser, &table));
    engine.begin_turn(1).unwrap();

    assert!(engine.world().scheduler().bin(p(1)).contains(&EntityId(5004)));
    assert_eq!(engine.select_next_tier().unwrap(), None);

    engine.run_day().unwrap();
    assert_eq!(state(&engine, 5004), CommandState::Queued);
}

// ----------------------------------------------------------------------------
// Multi-day commands
// ----------------------------------------------------------------------------

#[test]
fn three_day_command_completes_on_the_third_step() {
    let mut world = world_with(&[5003]);
    let (parser, table) = (WordParser, table());
    let mut engine = TurnEngine::new(&mut world, TurnEnv::without_hooks(&parser, &table));
    engine.begin_turn(1).unwrap();
    run_until(&mut engine, 9);

    order(engine.world_mut(), 5003, &["p2 3", "p4 5"]);
    engine.load_next(EntityId(5003)).unwrap();

    engine.run_day().unwrap();
    assert_eq!(state(&engine, 5003), CommandState::Active);
    assert_eq!(wait(&engine, 5003), 3);

    engine.run_day().unwrap();
    assert_eq!((state(&engine, 5003), wait(&engine, 5003)), (CommandState::Active, 2));
    engine.run_day().unwrap();
    assert_eq!((state(&engine, 5003), wait(&engine, 5003)), (CommandState::Active, 1));

    engine.run_day().unwrap();
    assert_eq!(engine.world().calendar.day, 13);
    let command = engine.world().command(EntityId(5003)).unwrap();
    assert_eq!(command.state, CommandState::Queued);
    assert_eq!(command.text, "p4 5");
    assert_eq!(command.previous_outcome, Some(Outcome::Success));
    assert!(engine.report().events.iter().any(|e| e.day == 13
        && e.actor == Some(EntityId(5003))
        && e.kind
            == CommandEventKind::Completed {
                outcome: Outcome::Success,
                days: 3
            }));
}

#[test]
fn failed_start_completes_in_the_same_dispatch() {
    let mut world = world_with(&[5001]);
    order(&mut world, 5001, &["fail"]);
    let (parser, table) = (WordParser, table());
    let mut engine = TurnEngine::new(&mut world, TurnEnv::without_hooks(&parser, &table));
    engine.begin_turn(1).unwrap();
    engine.run_day().unwrap();

    let command = engine.world().command(EntityId(5001)).unwrap();
    assert!(command.is_idle());
    assert_eq!(command.previous_outcome, Some(Outcome::Failure));
}

#[test]
fn inhibited_finish_is_skipped_and_cleared_on_the_next_dispatch() {
    let mut world = world_with(&[5001]);
    order(&mut world, 5001, &["quiet 1 1", "quiet 1"]);
    let (parser, table) = (WordParser, table());
    let mut engine = TurnEngine::new(&mut world, TurnEnv::without_hooks(&parser, &table));
    engine.begin_turn(1).unwrap();

    engine.run_day().unwrap();
    assert!(engine.world().command(EntityId(5001)).unwrap().inhibit_finish);
    engine.run_day().unwrap();
    assert_eq!(QUIET_FINISHES.load(Ordering::SeqCst), 0);
    let command = engine.world().command(EntityId(5001)).unwrap();
    assert_eq!(command.previous_outcome, Some(Outcome::Success));
    assert_eq!(command.text, "quiet 1");

    run_until(&mut engine, 6);
    assert_eq!(QUIET_FINISHES.load(Ordering::SeqCst), 1);
    let completions = engine
        .report()
        .events
        .iter()
        .filter(|e| matches!(e.kind, CommandEventKind::Completed { outcome: Outcome::Success, .. }))
        .count();
    assert_eq!(completions, 2);
    assert_eq!(state(&engine, 5001), CommandState::Idle);
}

#[test]
fn start_routine_sees_the_current_day() {
    let mut world = world_with(&[5001, 5002]);
    order(&mut world, 5001, &["until 4"]);
    order(&mut world, 5002, &["until 1"]);
    let (parser, table) = (WordParser, table());
    let mut engine = TurnEngine::new(&mut world, TurnEnv::without_hooks(&parser, &table));
    engine.begin_turn(1).unwrap();

    engine.run_day().unwrap();
    assert_eq!(wait(&engine, 5001), 3);
    assert_eq!(
        engine.world().command(EntityId(5002)).unwrap().previous_outcome,
        Some(Outcome::Failure)
    );

    run_until(&mut engine, 4);
    assert!(engine.report().events.iter().any(|e| e.day == 4
        && e.actor == Some(EntityId(5001))
        && e.kind
            == CommandEventKind::Completed {
                outcome: Outcome::Success,
                days: 3
            }));
}

#[test]
fn extra_delay_holds_back_queued_and_active_commands() {
    let mut world = world_with(&[5001, 5002]);
    order(&mut world, 5001, &["p2"]);
    order(&mut world, 5002, &["p2 1"]);
    let (parser, table) = (WordParser, table());
    let mut engine = TurnEngine::new(&mut world, TurnEnv::without_hooks(&parser, &table));
    engine.begin_turn(1).unwrap();
    engine.world_mut().command_mut(EntityId(5001)).unwrap().extra_delay = 2;

    engine.run_day().unwrap();
    assert_eq!(state(&engine, 5001), CommandState::Queued);
    assert_eq!(state(&engine, 5002), CommandState::Active);
    engine.world_mut().command_mut(EntityId(5002)).unwrap().extra_delay = 1;

    // Day 2: 5001 ages to zero; 5002 burns its delay instead of its wait.
    engine.run_day().unwrap();
    assert_eq!(state(&engine, 5001), CommandState::Queued);
    assert_eq!(wait(&engine, 5002), 1);

    engine.run_day().unwrap();
    assert_eq!(starts_on(&engine, 3), vec![5001]);
    assert_eq!(state(&engine, 5002), CommandState::Idle);
}

// ----------------------------------------------------------------------------
// Stacking suspension
// ----------------------------------------------------------------------------

#[test]
fn follower_wait_is_frozen_while_leader_travels() {
    const LEADER: u32 = 5006;
    const FOLLOWER: u32 = 5005;

    let mut world = world_with(&[FOLLOWER, LEADER]);
    world
        .move_to(EntityId(FOLLOWER), Location::Actor(EntityId(LEADER)))
        .unwrap();
    order(&mut world, FOLLOWER, &["p3 2"]);
    let (parser, table) = (WordParser, table());
    let mut engine = TurnEngine::new(&mut world, TurnEnv::without_hooks(&parser, &table));
    engine.begin_turn(1).unwrap();
    engine.run_day().unwrap();
    assert_eq!(state(&engine, FOLLOWER), CommandState::Active);

    order(engine.world_mut(), LEADER, &["march 3"]);
    engine.load_next(EntityId(LEADER)).unwrap();

    // Leader marches days 2-5 and stops during day 5's step.
    for day in 2..=5 {
        engine.run_day().unwrap();
        assert_eq!(wait(&engine, FOLLOWER), 2, "day {day}");
        assert_eq!(state(&engine, FOLLOWER), CommandState::Active);
    }
    assert_eq!(state(&engine, LEADER), CommandState::Idle);
    assert!(!engine.world().in_transit(EntityId(FOLLOWER)).unwrap());

    engine.run_day().unwrap();
    assert_eq!(wait(&engine, FOLLOWER), 1);
    engine.run_day().unwrap();
    assert_eq!(state(&engine, FOLLOWER), CommandState::Idle);
}

#[test]
fn queued_follower_is_not_selected_while_in_transit() {
    let mut world = world_with(&[5001, 5002]);
    world
        .move_to(EntityId(5002), Location::Actor(EntityId(5001)))
        .unwrap();
    world.set_stack_moving(EntityId(5001), true).unwrap();
    order(&mut world, 5002, &["p0"]);
    let (parser, table) = (WordParser, table());
    let mut engine = TurnEngine::new(&mut world, TurnEnv::without_hooks(&parser, &table));
    engine.begin_turn(1).unwrap();

    assert!(!engine.is_ready(EntityId(5002), p(0)).unwrap());
    engine.run_day().unwrap();
    assert_eq!(state(&engine, 5002), CommandState::Queued);
}

// ----------------------------------------------------------------------------
// Parse failures
// ----------------------------------------------------------------------------

#[test]
fn unparseable_orders_never_enter_a_bin() {
    let mut world = world_with(&[5001]);
    order(&mut world, 5001, &["dance", "ghost", "p1"]);
    let hooks = CountingHooks::default();
    let (parser, table) = (WordParser, table());
    let mut engine = TurnEngine::new(&mut world, TurnEnv::new(&parser, &table, &hooks));
    engine.begin_turn(1).unwrap();

    let failed: Vec<&str> = engine
        .report()
        .events
        .iter()
        .filter_map(|e| match &e.kind {
            CommandEventKind::ParseFailed { text, .. } => Some(text.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(failed, vec!["dance", "ghost"]);
    assert_eq!(hooks.failures.load(Ordering::SeqCst), 2);

    let command = engine.world().command(EntityId(5001)).unwrap();
    assert_eq!(command.state, CommandState::Queued);
    assert_eq!(command.text, "p1");
    assert_eq!(
        engine.world().scheduler().slot_of(EntityId(5001)),
        Some(Slot::Bin(p(1)))
    );
}

#[test]
fn lone_bad_order_leaves_actor_idle() {
    let mut world = world_with(&[5001]);
    order(&mut world, 5001, &["p9 1"]);
    let (parser, table) = (WordParser, table());
    let mut engine = TurnEngine::new(&mut world, TurnEnv::without_hooks(&parser, &table));
    engine.begin_turn(1).unwrap();

    assert_eq!(state(&engine, 5001), CommandState::Idle);
    assert_eq!(engine.world().scheduler().slot_of(EntityId(5001)), None);
    assert_eq!(engine.world().scheduler().queued_len(), 0);
}

// ----------------------------------------------------------------------------
// Cancellation
// ----------------------------------------------------------------------------

#[test]
fn interrupt_cancels_without_loading_next() {
    let mut world = world_with(&[5001]);
    order(&mut world, 5001, &["march 5", "p4"]);
    let (parser, table) = (WordParser, table());
    let mut engine = TurnEngine::new(&mut world, TurnEnv::without_hooks(&parser, &table));
    engine.begin_turn(1).unwrap();
    engine.run_day().unwrap();
    assert!(engine.world().entity(EntityId(5001)).unwrap().is_moving());

    assert!(engine.interrupt(EntityId(5001)).unwrap());

    assert_eq!(state(&engine, 5001), CommandState::Idle);
    assert!(!engine.world().entity(EntityId(5001)).unwrap().is_moving());
    assert_eq!(engine.world().orders.count(PLAYER, EntityId(5001)), 1);
    assert!(!engine.interrupt(EntityId(5001)).unwrap());
}

#[test]
fn force_stop_puts_stop_ahead_of_pending_orders() {
    let mut world = world_with(&[5001]);
    order(&mut world, 5001, &["p3 9", "p4"]);
    let (parser, table) = (WordParser, table());
    let mut engine = TurnEngine::new(&mut world, TurnEnv::without_hooks(&parser, &table));
    engine.begin_turn(1).unwrap();
    engine.run_day().unwrap();

    engine.force_stop(EntityId(5001)).unwrap();
    let command = engine.world().command(EntityId(5001)).unwrap();
    assert_eq!(command.text, RealmConfig::STOP_ORDER);
    assert_eq!(command.priority, p(0));

    engine.run_day().unwrap();
    assert_eq!(starts_on(&engine, 2), vec![5001, 5001]);
    assert_eq!(state(&engine, 5001), CommandState::Idle);
    assert_eq!(engine.world().orders.count(PLAYER, EntityId(5001)), 0);
}

// ----------------------------------------------------------------------------
// Hooks
// ----------------------------------------------------------------------------

#[test]
fn engagement_check_fires_once_per_day_at_tier_three() {
    let mut world = world_with(&[5001, 5002]);
    order(&mut world, 5001, &["p3", "p4", "p3"]);
    order(&mut world, 5002, &["p4"]);
    let hooks = CountingHooks::default();
    let (parser, table) = (WordParser, table());
    let mut engine = TurnEngine::new(&mut world, TurnEnv::new(&parser, &table, &hooks));
    engine.begin_turn(1).unwrap();
    engine.run_day().unwrap();

    assert_eq!(hooks.engagements.load(Ordering::SeqCst), 1);

    order(engine.world_mut(), 5002, &["p4"]);
    engine.load_next(EntityId(5002)).unwrap();
    engine.run_day().unwrap();
    assert_eq!(hooks.engagements.load(Ordering::SeqCst), 2);

    // Nothing at tier three or above: no check on day 3.
    engine.run_day().unwrap();
    assert_eq!(hooks.engagements.load(Ordering::SeqCst), 2);
}

#[test]
fn engagement_check_waits_for_a_request_when_not_daily() {
    let mut world = world_with(&[5001]);
    world.config.daily_engagement_check = false;
    order(&mut world, 5001, &["p3"]);
    let hooks = CountingHooks::default();
    let (parser, table) = (WordParser, table());
    let mut engine = TurnEngine::new(&mut world, TurnEnv::new(&parser, &table, &hooks));
    engine.begin_turn(1).unwrap();
    engine.run_day().unwrap();
    assert_eq!(hooks.engagements.load(Ordering::SeqCst), 0);

    engine.world_mut().request_engagement_check();
    order(engine.world_mut(), 5001, &["p3"]);
    engine.load_next(EntityId(5001)).unwrap();
    engine.run_day().unwrap();
    assert_eq!(hooks.engagements.load(Ordering::SeqCst), 1);
    assert!(!engine.world().scheduler().engagement_pending());
}

#[test]
fn fatal_hook_error_aborts_the_turn() {
    let mut world = world_with(&[5001]);
    let hooks = CountingHooks {
        break_consistency: true,
        ..CountingHooks::default()
    };
    let (parser, table) = (WordParser, table());
    let engine = TurnEngine::new(&mut world, TurnEnv::new(&parser, &table, &hooks));

    let err = engine.process_orders(1).unwrap_err();
    assert!(matches!(err, TurnError::ChainCorrupted { .. }));
    assert!(!world.calendar.days_complete);
}

// ----------------------------------------------------------------------------
// Whole-turn properties
// ----------------------------------------------------------------------------

#[test]
fn full_turn_keeps_slots_consistent_and_drains_every_order() {
    let actors: Vec<u32> = (5001..5021).collect();
    let mut world = world_with(&actors);
    for &actor in &actors {
        let texts: Vec<String> = (0..6)
            .map(|i| format!("p{} {}", (actor + i) % 5, (actor + i) % 3))
            .collect();
        let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
        order(&mut world, actor, &refs);
    }
    let (parser, table) = (WordParser, table());
    let mut engine = TurnEngine::new(&mut world, TurnEnv::without_hooks(&parser, &table));

    engine.begin_turn(1).unwrap();
    assert_slots_consistent(engine.world());
    for _ in 0..engine.world().config.month_days {
        engine.run_day().unwrap();
        assert_slots_consistent(engine.world());
    }
    let report = engine.finish_turn();

    assert_eq!(world.orders.total(), 0);
    assert_eq!(report.completions(), actors.len() * 6);
    assert!(world.calendar.days_complete);
    assert!(world.entities.verify_chains().is_ok());
}

#[test]
fn rebuilt_scheduler_matches_the_live_one() {
    let mut world = world_with(&[5001, 5002, 5003, 5004]);
    order(&mut world, 5001, &["p2 4", "p1"]);
    order(&mut world, 5002, &["p3 1", "p0 2"]);
    order(&mut world, 5003, &["p1 2"]);
    order(&mut world, 5004, &["p4", "p4 3"]);
    world.entity_mut(EntityId(5004)).unwrap().flags |= EntityFlags::PRISONER;
    let (parser, table) = (WordParser, table());

    {
        let mut engine = TurnEngine::new(&mut world, TurnEnv::without_hooks(&parser, &table));
        engine.begin_turn(1).unwrap();
        run_until(&mut engine, 2);
    }

    let mut restored = world.clone();
    restored.rebuild_schedule();
    assert_eq!(restored.scheduler().running(), world.scheduler().running());
    for t in 0..5 {
        assert_eq!(restored.scheduler().bin(p(t)), world.scheduler().bin(p(t)));
    }

    let live = TurnEngine::new(&mut world, TurnEnv::without_hooks(&parser, &table));
    let live_next = live.select_next_tier().unwrap();
    let live_ready: Vec<bool> = (5001..5005)
        .map(|a| live.is_ready(EntityId(a), p(4)).unwrap())
        .collect();
    drop(live);

    let copy = TurnEngine::new(&mut restored, TurnEnv::without_hooks(&parser, &table));
    assert_eq!(copy.select_next_tier().unwrap(), live_next);
    let copy_ready: Vec<bool> = (5001..5005)
        .map(|a| copy.is_ready(EntityId(a), p(4)).unwrap())
        .collect();
    assert_eq!(copy_ready, live_ready);
}

#[cfg(feature = "serde")]
#[test]
fn persisted_world_resumes_identically() {
    let mut world = world_with(&[5001, 5002, 5003]);
    order(&mut world, 5001, &["p2 4", "p1", "p3 2"]);
    order(&mut world, 5002, &["p3 1", "p0 2", "p4 6"]);
    order(&mut world, 5003, &["march 2", "p1 2"]);
    let (parser, table) = (WordParser, table());

    {
        let mut engine = TurnEngine::new(&mut world, TurnEnv::without_hooks(&parser, &table));
        engine.begin_turn(1).unwrap();
        run_until(&mut engine, 3);
    }
    let mut restored = World::from_bytes(&world.to_bytes().unwrap()).unwrap();
    assert_eq!(
        hex::encode(restored.digest().unwrap()),
        hex::encode(world.digest().unwrap())
    );

    let mut live_starts = Vec::new();
    let mut copy_starts = Vec::new();
    for (target, starts) in [(&mut world, &mut live_starts), (&mut restored, &mut copy_starts)] {
        let mut engine = TurnEngine::new(target, TurnEnv::without_hooks(&parser, &table));
        run_until(&mut engine, 10);
        starts.extend(engine.report().start_order());
    }
    assert_eq!(live_starts, copy_starts);
    assert_eq!(world.entities, restored.entities);
}
