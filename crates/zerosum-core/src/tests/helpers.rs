//! Test helper functions for setting up matches and driving bots.

use crate::board::Cell;
use crate::bot::{BotDecision, BotPolicy};
use crate::config::MatchConfig;
use crate::engine::TurnEngine;
use crate::intent::{Intent, Outcome};
use crate::replica::MemoryStore;
use crate::state::{GameState, Participant};
use crate::unit::BuildingKind;

// =============================================================================
// Match Setup
// =============================================================================

/// Two human seats, Alice (seat 0) and Bob (seat 1).
pub fn human_seats() -> Vec<Participant> {
    vec![Participant::human("Alice", "Red"), Participant::human("Bob", "Blue")]
}

/// A two-player match past setup, with nexuses at `a` and `b`.
pub fn started_duel(a: Cell, b: Cell) -> TurnEngine {
    started_duel_with(MatchConfig::default(), a, b)
}

/// Like [`started_duel`] with a custom configuration.
pub fn started_duel_with(config: MatchConfig, a: Cell, b: Cell) -> TurnEngine {
    let mut engine = TurnEngine::new(config, human_seats()).unwrap();
    engine.submit(0, Intent::PlaceNexus(a)).unwrap();
    engine.submit(1, Intent::PlaceNexus(b)).unwrap();
    engine
}

/// A sandbox match past setup, with the nexus at `at`.
pub fn started_sandbox(at: Cell) -> TurnEngine {
    let mut engine = TurnEngine::new(MatchConfig::sandbox(), vec![Participant::human("Solo", "Red")]).unwrap();
    engine.submit(0, Intent::PlaceNexus(at)).unwrap();
    engine
}

/// Submits a build that is expected to succeed.
pub fn build(engine: &mut TurnEngine, seat: usize, kind: BuildingKind, cell: Cell) {
    let outcome = engine.submit(seat, Intent::Build { kind, cell }).unwrap();
    assert!(matches!(outcome, Outcome::Built { .. }));
}

// =============================================================================
// Invariants
// =============================================================================

/// Panics unless pool, escrow and standing buildings add up to `max_energy`.
pub fn assert_energy_conserved(state: &GameState) {
    assert_eq!(
        state.energy_in_play(),
        u64::from(state.max_energy),
        "energy leaked at revision {}: pool {}, escrow {:?}",
        state.revision,
        state.energy_pool,
        state.players.iter().map(|p| p.escrow).collect::<Vec<_>>()
    );
}

// =============================================================================
// Bot Matches
// =============================================================================

/// Plays a bot-vs-bot match for at most `max_turns` turns and returns every
/// published snapshot.
pub fn play_bot_match(seed: u64, max_turns: usize) -> MemoryStore {
    let seats = vec![Participant::bot("left", "Red"), Participant::bot("right", "Blue")];
    let mut engine = TurnEngine::new(MatchConfig::default(), seats).unwrap();
    let mut bots = [BotPolicy::new(seed), BotPolicy::new(seed.wrapping_add(1))];
    let mut store = MemoryStore::new();

    for (seat, bot) in bots.iter_mut().enumerate() {
        if let BotDecision::PlaceNexus(cell) = bot.compute_turn(engine.state(), seat) {
            engine.submit(seat, Intent::PlaceNexus(cell)).unwrap();
            engine.publish_to(&mut store);
        }
    }

    for _ in 0..max_turns {
        if engine.state().is_over() {
            break;
        }
        let seat = engine.state().turn;
        let BotDecision::Turn(plan) = bots[seat].compute_turn(engine.state(), seat) else {
            break;
        };
        for intent in plan.intents() {
            if let Outcome::Fired(report) = engine.submit(seat, intent).unwrap() {
                bots[seat].record_shot(&report);
            }
            engine.publish_to(&mut store);
        }
    }
    store
}
