//! Built-in verbs driven through the real turn engine.

use std::sync::atomic::{AtomicUsize, Ordering};

use realm_content::{ActionTable, ScenarioLoader, StackRepair, TextOrderParser};
use realm_core::{
    CommandEventKind, CommandState, EntityId, Kind, Outcome, RealmConfig, Subkind, TurnEngine,
    TurnEnv, TurnError, TurnHooks, World,
};

const PLAYER: EntityId = EntityId(1001);
const FOREST: EntityId = EntityId(11_021);
const CITY: EntityId = EntityId(50_001);
const LEADER: EntityId = EntityId(5001);
const FOLLOWER: EntityId = EntityId(5002);
const LONER: EntityId = EntityId(5003);
const RIVAL: EntityId = EntityId(5101);

const BASE: &str = r#"
    #![enable(implicit_some)]
    (
        seed: 77,
        entities: [
            (id: 1001, kind: player, subkind: pc),
            (id: 1002, kind: player, subkind: pc),
            (id: 11020, kind: loc, subkind: province),
            (id: 11021, kind: loc, subkind: forest),
            (id: 50001, kind: loc, subkind: city, location: In(11020)),
            (id: 5001, kind: char, subkind: pc, owner: 1001, location: In(50001)),
            (id: 5002, kind: char, subkind: pc, owner: 1001, location: With(5001)),
            (id: 5003, kind: char, subkind: pc, owner: 1001, location: In(50001)),
            (id: 5101, kind: char, subkind: pc, owner: 1002, location: In(50001)),
        ],
    )
"#;

fn world_with(config: RealmConfig, orders: &[(EntityId, &[&str])]) -> World {
    let mut world = ScenarioLoader::parse(BASE).unwrap().build(config).unwrap();
    for (actor, texts) in orders {
        for text in *texts {
            world.queue_order(*actor, *text).unwrap();
        }
    }
    world
}

fn days(engine: &mut TurnEngine<'_>, count: u32) {
    for _ in 0..count {
        engine.run_day().unwrap();
    }
}

fn state(engine: &TurnEngine<'_>, actor: EntityId) -> CommandState {
    engine.world().command(actor).map(|c| c.state).unwrap()
}

fn last_outcome(engine: &TurnEngine<'_>, actor: EntityId) -> Option<Outcome> {
    engine.world().command(actor).and_then(|c| c.previous_outcome)
}

#[test]
fn move_carries_the_stack_after_travel_days() {
    let table = ActionTable::builtin();
    let parser = TextOrderParser::new(&table);
    let mut world = world_with(RealmConfig::default(), &[(LEADER, &["move 11021"])]);
    let mut engine = TurnEngine::new(&mut world, TurnEnv::new(&parser, &table, &StackRepair));
    engine.begin_turn(1).unwrap();

    days(&mut engine, 3);
    assert!(engine.world().in_transit(FOLLOWER).unwrap());
    assert_eq!(engine.world().place_of(FOLLOWER).unwrap(), Some(CITY));

    days(&mut engine, 1);
    assert_eq!(last_outcome(&engine, LEADER), Some(Outcome::Success));
    assert_eq!(engine.world().place_of(FOLLOWER).unwrap(), Some(FOREST));
    assert!(!engine.world().entity(LEADER).unwrap().is_moving());
    assert!(!engine.world().in_transit(FOLLOWER).unwrap());
}

#[test]
fn follower_studies_only_after_the_stack_arrives() {
    let table = ActionTable::builtin();
    let parser = TextOrderParser::new(&table);
    let mut world = world_with(
        RealmConfig::default(),
        &[(LEADER, &["move 11021"]), (FOLLOWER, &["study 2"])],
    );
    let mut engine = TurnEngine::new(&mut world, TurnEnv::new(&parser, &table, &StackRepair));
    engine.begin_turn(1).unwrap();

    days(&mut engine, 4);
    assert_eq!(state(&engine, FOLLOWER), CommandState::Queued);

    days(&mut engine, 1);
    assert_eq!(state(&engine, FOLLOWER), CommandState::Active);
    assert_eq!(engine.report().start_order().last(), Some(&FOLLOWER));
}

#[test]
fn followers_cannot_lead_a_move() {
    let table = ActionTable::builtin();
    let parser = TextOrderParser::new(&table);
    let mut world = world_with(RealmConfig::default(), &[(FOLLOWER, &["move 11021"])]);
    let mut engine = TurnEngine::new(&mut world, TurnEnv::new(&parser, &table, &StackRepair));
    engine.begin_turn(1).unwrap();
    days(&mut engine, 1);

    assert_eq!(last_outcome(&engine, FOLLOWER), Some(Outcome::Failure));
    assert!(!engine.world().entity(LEADER).unwrap().is_moving());
}

#[test]
fn stack_and_unstack_resolve_on_the_same_day() {
    let table = ActionTable::builtin();
    let parser = TextOrderParser::new(&table);
    let mut world = world_with(
        RealmConfig::default(),
        &[(LONER, &["stack 5101", "unstack"])],
    );
    let mut engine = TurnEngine::new(&mut world, TurnEnv::new(&parser, &table, &StackRepair));
    engine.begin_turn(1).unwrap();
    days(&mut engine, 1);

    let completed: Vec<_> = engine
        .report()
        .for_actor(LONER)
        .filter_map(|event| match event.kind {
            CommandEventKind::Completed { outcome, .. } => Some((event.day, outcome)),
            _ => None,
        })
        .collect();
    assert_eq!(completed, vec![(1, Outcome::Success), (1, Outcome::Success)]);
    assert_eq!(engine.world().parent(LONER).unwrap(), None);
    assert_eq!(engine.world().place_of(LONER).unwrap(), Some(CITY));
}

#[test]
fn interrupted_move_stops_the_stack_where_it_is() {
    let table = ActionTable::builtin();
    let parser = TextOrderParser::new(&table);
    let mut world = world_with(RealmConfig::default(), &[(LEADER, &["move 11021"])]);
    let mut engine = TurnEngine::new(&mut world, TurnEnv::new(&parser, &table, &StackRepair));
    engine.begin_turn(1).unwrap();
    days(&mut engine, 2);

    assert!(engine.interrupt(LEADER).unwrap());
    assert!(!engine.world().in_transit(FOLLOWER).unwrap());
    assert_eq!(engine.world().place_of(LEADER).unwrap(), Some(CITY));
    assert_eq!(state(&engine, LEADER), CommandState::Idle);
}

#[derive(Default)]
struct EngagementCounter(AtomicUsize);

impl TurnHooks for EngagementCounter {
    fn check_engagements(&self, _engine: &mut TurnEngine<'_>) -> Result<(), TurnError> {
        self.0.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[test]
fn attack_requests_an_engagement_check() {
    let config = RealmConfig {
        daily_engagement_check: false,
        ..RealmConfig::default()
    };
    let table = ActionTable::builtin();
    let parser = TextOrderParser::new(&table);
    let hooks = EngagementCounter::default();
    let mut world = world_with(
        config,
        &[(LEADER, &["attack 5101"]), (LONER, &["wait 2"])],
    );
    let mut engine = TurnEngine::new(&mut world, TurnEnv::new(&parser, &table, &hooks));
    engine.begin_turn(1).unwrap();
    days(&mut engine, 1);

    assert_eq!(last_outcome(&engine, LEADER), Some(Outcome::Success));
    assert_eq!(hooks.0.load(Ordering::SeqCst), 1);
}

#[test]
fn attacking_a_friendly_unit_fails() {
    let table = ActionTable::builtin();
    let parser = TextOrderParser::new(&table);
    let mut world = world_with(RealmConfig::default(), &[(LEADER, &["attack 5003"])]);
    let mut engine = TurnEngine::new(&mut world, TurnEnv::without_hooks(&parser, &table));
    engine.begin_turn(1).unwrap();
    days(&mut engine, 1);

    assert_eq!(last_outcome(&engine, LEADER), Some(Outcome::Failure));
}

#[test]
fn unknown_verbs_are_skipped_at_load() {
    let table = ActionTable::builtin();
    let parser = TextOrderParser::new(&table);
    let mut world = world_with(RealmConfig::default(), &[(LONER, &["recruit 20", "wait 1"])]);
    let mut engine = TurnEngine::new(&mut world, TurnEnv::without_hooks(&parser, &table));
    engine.begin_turn(1).unwrap();

    assert!(engine.report().for_actor(LONER).any(|event| matches!(
        &event.kind,
        CommandEventKind::ParseFailed { text, .. } if text == "recruit 20"
    )));
    let command = engine.world().command(LONER).unwrap();
    assert_eq!(command.state, CommandState::Queued);
    assert_eq!(command.text, "wait 1");
}

#[test]
fn guard_stands_down_when_a_new_order_arrives() {
    let table = ActionTable::builtin();
    let parser = TextOrderParser::new(&table);
    let mut world = world_with(RealmConfig::default(), &[(RIVAL, &["guard"])]);
    let mut engine = TurnEngine::new(&mut world, TurnEnv::without_hooks(&parser, &table));
    engine.begin_turn(1).unwrap();

    days(&mut engine, 3);
    assert_eq!(state(&engine, RIVAL), CommandState::Active);

    engine.world_mut().queue_order(RIVAL, "wait 1").unwrap();
    days(&mut engine, 1);

    let command = engine.world().command(RIVAL).unwrap();
    assert_eq!(command.state, CommandState::Queued);
    assert_eq!(command.text, "wait 1");
    assert_eq!(command.previous_outcome, Some(Outcome::Success));
}

#[test]
fn explore_either_finds_a_place_or_fails_after_a_week() {
    let table = ActionTable::builtin();
    let parser = TextOrderParser::new(&table);
    let mut world = world_with(RealmConfig::default(), &[(LONER, &["explore"])]);
    let mut engine = TurnEngine::new(&mut world, TurnEnv::without_hooks(&parser, &table));
    engine.begin_turn(1).unwrap();
    days(&mut engine, 9);

    let world = engine.world();
    let mines: Vec<_> = world.entities.iter_subkind(Subkind::Mine).collect();
    assert_eq!(world.command(LONER).map(|c| c.state), Some(CommandState::Idle));
    match world.command(LONER).and_then(|c| c.previous_outcome) {
        Some(Outcome::Success) => {
            assert_eq!(mines.len(), 1);
            assert_eq!(world.entity(mines[0]).unwrap().kind(), Kind::Loc);
            assert_eq!(world.place_of(LONER).unwrap(), Some(CITY));
            assert!(world.entity(CITY).unwrap().here().contains(&mines[0]));
        }
        other => {
            assert_eq!(other, Some(Outcome::Failure));
            assert!(mines.is_empty());
        }
    }
}

#[test]
fn player_orders_run_like_any_unit() {
    let table = ActionTable::builtin();
    let parser = TextOrderParser::new(&table);
    let mut world = world_with(RealmConfig::default(), &[(PLAYER, &["wait 1"])]);
    let report = TurnEngine::new(&mut world, TurnEnv::new(&parser, &table, &StackRepair))
        .process_orders(1)
        .unwrap();

    assert!(report
        .for_actor(PLAYER)
        .any(|event| matches!(event.kind, CommandEventKind::Completed { outcome: Outcome::Success, .. })));
    assert_eq!(world.orders.total(), 0);
}
