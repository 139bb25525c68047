//! Headless match execution.
//!
//! Each match seats one [`BotPolicy`] per seat and plays until a nexus falls
//! or the turn limit is reached. Every accepted transition is published to an
//! in-memory store, mirroring what a networked host would broadcast.

use anyhow::{bail, Context, Result};
use serde::Serialize;
use tracing::{debug, info, warn};

use zerosum_core::bot::{BotDecision, BotPolicy};
use zerosum_core::{Intent, MatchConfig, MatchMode, MatchStatus, MemoryStore, Outcome, Participant, TurnEngine};

/// Result of one match.
#[derive(Debug, Clone, Serialize)]
pub struct MatchSummary {
    /// Seed the bots were created from.
    pub seed: u64,
    /// Final status.
    pub status: MatchStatus,
    /// Winning seat, if the match ended.
    pub winner: Option<usize>,
    /// Turns played after setup.
    pub turns: usize,
    /// Shots fired.
    pub shots: usize,
    /// Buildings destroyed by shots.
    pub destroyed: u32,
    /// Snapshots published.
    pub snapshots: usize,
    /// Final revision.
    pub revision: u64,
    /// Nexus hit points per seat at the end.
    pub nexus_hp: Vec<u32>,
}

fn seats_for(mode: MatchMode) -> Vec<Participant> {
    match mode {
        MatchMode::TwoPlayer => vec![Participant::bot("left", "Red"), Participant::bot("right", "Blue")],
        MatchMode::Sandbox => vec![Participant::bot("solo", "Green")],
    }
}

/// Plays one match to completion or `max_turns`.
///
/// # Errors
///
/// Fails if the configuration is invalid or the engine rejects an intent a
/// bot produced, which indicates a policy bug.
pub fn play_match(config: MatchConfig, seed: u64, max_turns: usize) -> Result<MatchSummary> {
    let respect_block = config.enforce_reciprocal_block;
    let mut engine = TurnEngine::new(config.clone(), seats_for(config.mode)).context("invalid match configuration")?;
    let mut bots: Vec<BotPolicy> = (0..config.mode.seat_count() as u64)
        .map(|seat| BotPolicy::new(seed.wrapping_mul(1_000_003).wrapping_add(seat)).with_reciprocal_block(respect_block))
        .collect();
    let mut store = MemoryStore::new();

    for (seat, bot) in bots.iter_mut().enumerate() {
        let BotDecision::PlaceNexus(cell) = bot.compute_turn(engine.state(), seat) else {
            bail!("seat {seat} found no cell for its nexus");
        };
        engine
            .submit(seat, Intent::PlaceNexus(cell))
            .with_context(|| format!("seat {seat} could not place its nexus at {cell}"))?;
        engine.publish_to(&mut store);
    }

    let mut turns = 0;
    let mut shots = 0;
    let mut destroyed = 0;
    while !engine.state().is_over() && turns < max_turns {
        let seat = engine.state().turn;
        let BotDecision::Turn(plan) = bots[seat].compute_turn(engine.state(), seat) else {
            warn!(seed, seat, "bot had nothing to do mid-match");
            break;
        };
        for intent in plan.intents() {
            let outcome = engine
                .submit(seat, intent.clone())
                .with_context(|| format!("seed {seed}: seat {seat} intent {intent:?} rejected on turn {turns}"))?;
            if let Outcome::Fired(report) = outcome {
                bots[seat].record_shot(&report);
                shots += 1;
                destroyed += report.destroyed;
            }
            engine.publish_to(&mut store);
        }
        turns += 1;
    }

    let state = engine.state();
    if state.status == MatchStatus::InProgress {
        debug!(seed, turns, "turn limit reached");
    } else {
        info!(seed, turns, winner = ?state.winner, "match finished");
    }

    Ok(MatchSummary {
        seed,
        status: state.status,
        winner: state.winner,
        turns,
        shots,
        destroyed,
        snapshots: store.len(),
        revision: state.revision,
        nexus_hp: state.players.iter().map(|p| p.nexus_hp).collect(),
    })
}
