//! Integration tests for full turns through the engine.
//!
//! These exercise the tracer, economy and state machine together:
//! - Escrow accounting across a shot and the following turn change
//! - Match end on a nexus reaching zero
//! - Boundary bounces and audience-tagged logs
//! - Snapshot replication and resumption

use crate::beam::{TraceError, MAX_BEAM_STEPS};
use crate::board::{Cell, Direction};
use crate::config::MatchConfig;
use crate::engine::TurnEngine;
use crate::error::{EngineError, IntentError};
use crate::intent::{AttackReport, Intent, Outcome};
use crate::replica::{MemoryStore, SnapshotDisposition};
use crate::state::{Audience, MatchStatus, Phase, SANDBOX_TURN_BUDGET};
use crate::unit::BuildingKind;

use super::helpers::{assert_energy_conserved, build, started_duel, started_duel_with, started_sandbox};

fn fire(engine: &mut TurnEngine, seat: usize, direction: Direction) -> AttackReport {
    engine.submit(seat, Intent::EndPhase).unwrap();
    match engine.submit(seat, Intent::Fire(direction)).unwrap() {
        Outcome::Fired(report) => report,
        other => panic!("expected a shot, got {other:?}"),
    }
}

// =============================================================================
// Economy
// =============================================================================

#[test]
fn fire_conserves_energy_and_credits_escrow() {
    let mut engine = started_duel(Cell::new(3, 1), Cell::new(6, 8));
    engine.submit(0, Intent::EndTurn).unwrap();

    // Bob spends his budget on a mirror that sits in Alice's line of fire.
    build(&mut engine, 1, BuildingKind::Mirror(Direction::N), Cell::new(3, 7));
    engine.submit(1, Intent::EndTurn).unwrap();
    assert_energy_conserved(engine.state());

    let before = engine.snapshot();
    let report = fire(&mut engine, 0, Direction::E);
    let after = engine.state();

    let building_hits = report.trace.hits.iter().filter(|h| h.unit.is_building()).count();
    assert_eq!(report.destroyed as usize, building_hits);
    assert_eq!(report.destroyed, 1);
    assert_eq!(after.players[0].escrow, before.players[0].escrow + report.destroyed);
    assert_eq!(after.energy_pool, before.energy_pool + report.released);
    assert_energy_conserved(after);
}

#[test]
fn escrow_funds_the_shooters_next_turn() {
    let mut engine = started_duel(Cell::new(3, 1), Cell::new(6, 8));
    engine.submit(0, Intent::EndTurn).unwrap();
    build(&mut engine, 1, BuildingKind::Pylon, Cell::new(3, 5));
    engine.submit(1, Intent::EndTurn).unwrap();

    fire(&mut engine, 0, Direction::E);
    assert_eq!(engine.state().players[0].escrow, 1);
    assert_eq!(engine.state().energy_pool, 9);

    let Outcome::TurnPassed { next, released } = engine.submit(1, Intent::EndTurn).unwrap() else {
        panic!("expected the turn to pass");
    };
    assert_eq!((next, released), (0, 1));
    let state = engine.state();
    assert_eq!(state.energy_pool, 10);
    assert_eq!(state.players[0].escrow, 0);
    assert_eq!(state.turn_budget, 1);
    assert_energy_conserved(state);
}

#[test]
fn pylons_raise_the_turn_budget() {
    let mut engine = started_duel(Cell::new(3, 1), Cell::new(6, 8));
    build(&mut engine, 0, BuildingKind::Pylon, Cell::new(0, 0));
    engine.submit(0, Intent::EndTurn).unwrap();
    engine.submit(1, Intent::EndTurn).unwrap();
    assert_eq!(engine.state().turn_budget, 2);

    build(&mut engine, 0, BuildingKind::Pylon, Cell::new(0, 1));
    build(&mut engine, 0, BuildingKind::Pylon, Cell::new(0, 2));
    assert_eq!(engine.state().turn_budget, 0);
    assert_energy_conserved(engine.state());
}

#[test]
fn turn_budget_is_capped_by_the_pool() {
    let config = MatchConfig {
        max_energy: 2,
        ..MatchConfig::default()
    };
    let mut engine = started_duel_with(config, Cell::new(3, 1), Cell::new(6, 8));
    build(&mut engine, 0, BuildingKind::Pylon, Cell::new(0, 0));
    engine.submit(0, Intent::EndTurn).unwrap();
    engine.submit(1, Intent::EndTurn).unwrap();

    // One pylon would allow two builds, but only one energy is left.
    let state = engine.state();
    assert_eq!(state.players[0].pylon_count(), 1);
    assert_eq!(state.energy_pool, 1);
    assert_eq!(state.turn_budget, 1);
    assert_energy_conserved(state);
}

// =============================================================================
// Match end
// =============================================================================

#[test]
fn last_hit_point_ends_the_match() {
    let config = MatchConfig {
        nexus_hp: 1,
        ..MatchConfig::default()
    };
    let mut engine = started_duel_with(config, Cell::new(3, 1), Cell::new(3, 8));
    engine.submit(0, Intent::EndTurn).unwrap();

    let report = fire(&mut engine, 1, Direction::W);
    assert_eq!(report.winner, Some(1));

    let state = engine.state();
    assert_eq!(state.players[0].nexus_hp, 0);
    assert_eq!(state.status, MatchStatus::GameOver);
    assert_eq!(state.phase, Phase::GameOver);
    assert_eq!(state.winner, Some(1));
    assert_eq!(state.turn, 1);
    assert_eq!(state.log.last().map(|e| e.msg.as_str()), Some("GAME OVER!"));

    let err = engine.submit(0, Intent::EndTurn).unwrap_err();
    assert_eq!(err, EngineError::InvalidIntent(IntentError::MatchOver));
}

#[test]
fn surviving_hit_keeps_the_match_going() {
    let mut engine = started_duel(Cell::new(3, 1), Cell::new(3, 8));
    let report = fire(&mut engine, 0, Direction::E);
    assert_eq!(report.winner, None);
    assert_eq!(engine.state().players[1].nexus_hp, 2);
    assert_eq!(engine.state().last_nexus_hit, Some(1));
    assert_eq!(engine.state().status, MatchStatus::InProgress);
    assert_eq!(engine.state().phase, Phase::BuyMove);
}

// =============================================================================
// Beam behaviour through the engine
// =============================================================================

#[test]
fn corner_shot_bounces_once_with_private_log() {
    // Bob at (0,9) fires SW across the board at Alice on (7,0).
    let mut engine = started_duel(Cell::new(7, 0), Cell::new(0, 9));
    engine.submit(0, Intent::EndTurn).unwrap();
    let report = fire(&mut engine, 1, Direction::SW);

    assert_eq!(report.trace.boundary_bounces, 1);
    let state = engine.state();
    let bounce = state
        .log
        .iter()
        .find(|e| e.msg == "Laser reflected off side boundary.")
        .unwrap();
    assert_eq!(bounce.audience, Audience::Player(0));
    assert!(state.log_for(0).any(|e| e.msg == "Laser reflected off side boundary."));
    assert!(!state.log_for(1).any(|e| e.msg == "Laser reflected off side boundary."));

    let last = &report.trace.log.last().unwrap().msg;
    assert!(last == "Laser escaped the system (MISS)." || last.starts_with("HIT "));
}

#[test]
fn sandbox_mirror_can_turn_a_shot_back() {
    let mut engine = started_sandbox(Cell::new(4, 2));
    build(&mut engine, 0, BuildingKind::Mirror(Direction::W), Cell::new(4, 6));
    let report = fire(&mut engine, 0, Direction::E);

    assert!(report.trace.struck_nexus_of(0));
    let state = engine.state();
    assert_eq!(state.players[0].nexus_hp, 2);
    assert_eq!(state.turn, 0);
    assert_eq!(state.phase, Phase::BuyMove);
    assert_eq!(state.turn_budget, SANDBOX_TURN_BUDGET);
    assert_eq!(state.blocked_fire_direction(0), None);
}

#[test]
fn moving_out_of_the_line_of_fire() {
    let mut engine = started_duel(Cell::new(3, 1), Cell::new(3, 8));
    engine.submit(0, Intent::EndTurn).unwrap();
    engine.submit(1, Intent::MoveNexus(Cell::new(4, 8))).unwrap();
    engine.submit(1, Intent::ResetTurn).unwrap();
    assert_eq!(engine.state().players[1].nexus, Some(Cell::new(3, 8)));
    // The reset also forgets the move, so another one is allowed.
    engine.submit(1, Intent::MoveNexus(Cell::new(1, 8))).unwrap();
    engine.submit(1, Intent::EndTurn).unwrap();

    let report = fire(&mut engine, 0, Direction::E);
    assert!(report.trace.hits.is_empty());
    assert_eq!(engine.state().players[1].nexus_hp, 3);
    assert_eq!(engine.state().players[1].nexus_start, Some(Cell::new(1, 8)));
}

#[test]
fn unresolvable_shot_leaves_the_match_untouched() {
    // A serpentine of mirrors folds the beam past its step budget.
    let mut engine = started_sandbox(Cell::new(0, 0));
    let serpentine = [
        (Cell::new(0, 9), Direction::SW),
        (Cell::new(1, 9), Direction::NW),
        (Cell::new(1, 0), Direction::SE),
        (Cell::new(2, 0), Direction::NE),
        (Cell::new(2, 9), Direction::SW),
        (Cell::new(3, 9), Direction::NW),
        (Cell::new(3, 0), Direction::SE),
        (Cell::new(4, 0), Direction::NE),
    ];
    for (cell, facing) in serpentine {
        build(&mut engine, 0, BuildingKind::Mirror(facing), cell);
    }
    engine.submit(0, Intent::EndPhase).unwrap();
    let before = engine.snapshot();

    let err = engine.submit(0, Intent::Fire(Direction::E)).unwrap_err();
    assert_eq!(
        err,
        EngineError::Inconsistent(TraceError::StepBudgetExhausted {
            origin: Cell::new(0, 0),
            direction: Direction::E,
            steps: MAX_BEAM_STEPS,
        })
    );
    assert_eq!(err.as_intent(), None);
    assert_eq!(engine.state(), &before);
    assert_eq!(
        serde_json::to_string(engine.state()).unwrap(),
        serde_json::to_string(&before).unwrap()
    );

    // Other directions still resolve.
    engine.submit(0, Intent::Fire(Direction::S)).unwrap();
    assert_eq!(engine.state().revision, before.revision + 1);
}

// =============================================================================
// Replication
// =============================================================================

#[test]
fn replica_applies_newer_and_discards_stale_snapshots() {
    let mut host = started_duel(Cell::new(3, 1), Cell::new(3, 8));
    let mut replica = TurnEngine::resume(MatchConfig::default(), host.snapshot()).unwrap();
    let old = host.snapshot();

    host.submit(0, Intent::EndTurn).unwrap();
    assert_eq!(replica.receive(host.snapshot()), SnapshotDisposition::Applied);
    assert_eq!(replica.state(), host.state());

    let revision = host.state().revision;
    assert_eq!(
        replica.receive(old.clone()),
        SnapshotDisposition::Stale {
            local: revision,
            received: old.revision,
        }
    );
    assert_eq!(
        replica.receive(host.snapshot()),
        SnapshotDisposition::Stale {
            local: revision,
            received: revision,
        }
    );
    assert_eq!(replica.state(), host.state());
}

#[test]
fn published_snapshot_resumes_through_json() {
    let mut engine = started_duel(Cell::new(3, 1), Cell::new(3, 8));
    build(&mut engine, 0, BuildingKind::Mirror(Direction::NE), Cell::new(2, 2));
    let mut store = MemoryStore::new();
    engine.publish_to(&mut store);

    let json = serde_json::to_string(store.latest().unwrap()).unwrap();
    let restored = serde_json::from_str(&json).unwrap();
    let mut resumed = TurnEngine::resume(MatchConfig::default(), restored).unwrap();
    assert_eq!(resumed.state(), engine.state());

    resumed.submit(0, Intent::EndPhase).unwrap();
    engine.submit(0, Intent::EndPhase).unwrap();
    assert_eq!(resumed.state(), engine.state());
}

#[test]
fn replica_resets_to_the_start_of_the_turn() {
    let mut host = started_duel(Cell::new(3, 1), Cell::new(3, 8));
    let pre_turn = host.snapshot();
    let mut replica = TurnEngine::resume(MatchConfig::default(), pre_turn.clone()).unwrap();

    build(&mut host, 0, BuildingKind::Pylon, Cell::new(0, 0));
    host.submit(0, Intent::MoveNexus(Cell::new(3, 2))).unwrap();
    host.submit(0, Intent::EndPhase).unwrap();
    assert_eq!(replica.receive(host.snapshot()), SnapshotDisposition::Applied);

    replica.submit(0, Intent::ResetTurn).unwrap();
    let mut expected = pre_turn.clone();
    expected.revision = replica.state().revision;
    assert_eq!(replica.state(), &expected);
    assert_energy_conserved(replica.state());

    // A snapshot resumed mid-turn unwinds the same way.
    host.submit(0, Intent::ResetTurn).unwrap();
    build(&mut host, 0, BuildingKind::Mirror(Direction::NE), Cell::new(1, 1));
    let mut resumed = TurnEngine::resume(MatchConfig::default(), host.snapshot()).unwrap();
    resumed.submit(0, Intent::ResetTurn).unwrap();
    assert_eq!(resumed.state().players, pre_turn.players);
    assert_eq!(resumed.state().energy_pool, pre_turn.energy_pool);
    assert_eq!(resumed.state().turn_budget, pre_turn.turn_budget);
    assert_eq!(resumed.state().phase, Phase::BuyMove);
    assert!(resumed.state().turn_actions.is_empty());
}
