//! Computer opponent.
//!
//! [`BotPolicy`] looks at a snapshot and plans a whole turn: an optional
//! nexus relocation, a few random structures, and a shot. The plan is a list
//! of ordinary [`Intent`]s, so the host feeds it to the engine exactly as it
//! would a human's input.
//!
//! Candidate shots are traced on a scratch copy with the planned actions
//! applied and sorted into [`ShotQuality`] buckets. The bot never fires a
//! [`ShotQuality::Fatal`] shot and prefers `Ok` shots heading towards the
//! opponent's half.
//!
//! All randomness comes from the policy's own `ChaCha8Rng`, so a seed and a
//! sequence of snapshots fully determine its decisions.

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::beam::{trace_laser, BeamTrace};
use crate::board::{Cell, Direction, BOARD_ROWS};
use crate::intent::{AttackReport, Intent};
use crate::pathfinder::is_valid_nexus_move;
use crate::state::{GameState, TurnAction};
use crate::unit::{Building, BuildingKind};

/// Random relocation destinations tried per turn.
pub const MOVE_ATTEMPTS: usize = 15;

/// Build rolls per turn; each has even odds of being skipped.
pub const BUILD_ATTEMPTS: usize = 10;

/// How a candidate shot would play out.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShotQuality {
    /// The beam comes back into the bot's own nexus.
    Fatal,
    /// It would destroy the same mirror as the bot's previous shot.
    Repetitive,
    /// It hits nothing and barely travels, or drifts away from the opponent.
    Useless,
    /// Worth firing.
    Ok,
}

/// Column step pointing from `seat`'s half towards the opponent.
#[must_use]
pub const fn toward_opponent(seat: usize) -> i32 {
    if seat == 0 {
        1
    } else {
        -1
    }
}

/// Classifies a traced shot fired by `seat`.
#[must_use]
pub fn classify_shot(trace: &BeamTrace, seat: usize, last_hit_mirror: Option<Cell>) -> ShotQuality {
    if trace.struck_nexus_of(seat) {
        return ShotQuality::Fatal;
    }
    if let (Some(mirror), Some(previous)) = (trace.first_mirror_hit(), last_hit_mirror) {
        if mirror == previous {
            return ShotQuality::Repetitive;
        }
    }
    if trace.hits.is_empty() {
        if trace.path.len() <= 1 {
            return ShotQuality::Useless;
        }
        let drift = trace.end_position().x - trace.origin.as_ivec2().x;
        if drift * toward_opponent(seat) < 0 {
            return ShotQuality::Useless;
        }
    }
    ShotQuality::Ok
}

/// What the bot remembers between turns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotMemory {
    /// Its nexus has been struck and has not moved since.
    pub was_hit_last_turn: bool,
    /// First mirror destroyed by its last resolved shot.
    pub last_hit_mirror: Option<Cell>,
}

/// A planned BuyMove + Attack turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotPlan {
    /// `MoveNexus` and `Build` intents, in order.
    pub actions: Vec<Intent>,
    /// Direction to fire, or `None` to skip.
    pub attack: Option<Direction>,
}

impl BotPlan {
    /// The full intent sequence: staged actions, `EndPhase`, then `Fire` or `Skip`.
    #[must_use]
    pub fn intents(&self) -> Vec<Intent> {
        let mut intents = self.actions.clone();
        intents.push(Intent::EndPhase);
        intents.push(self.attack.map_or(Intent::Skip, Intent::Fire));
        intents
    }
}

/// What the bot wants to do with the snapshot it was shown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BotDecision {
    /// Setup: place the nexus here.
    PlaceNexus(Cell),
    /// Play this turn.
    Turn(BotPlan),
    /// Nothing to do.
    Wait,
}

/// Seeded decision maker for one bot seat.
#[derive(Debug, Clone)]
pub struct BotPolicy {
    rng: ChaCha8Rng,
    memory: BotMemory,
    respect_reciprocal_block: bool,
}

impl BotPolicy {
    /// Creates a policy with its own deterministic random stream.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            memory: BotMemory::default(),
            respect_reciprocal_block: false,
        }
    }

    /// Never pick the direction [`GameState::blocked_fire_direction`] reports.
    /// Needed when the engine enforces that rule.
    #[must_use]
    pub fn with_reciprocal_block(mut self, respect: bool) -> Self {
        self.respect_reciprocal_block = respect;
        self
    }

    /// Memory carried between turns.
    #[must_use]
    pub fn memory(&self) -> &BotMemory {
        &self.memory
    }

    /// Remembers what a shot this bot fired actually did. Call it with the
    /// report of every accepted `Fire`; planning alone never changes memory.
    pub fn record_shot(&mut self, report: &AttackReport) {
        self.memory.last_hit_mirror = report.trace.first_mirror_hit();
    }

    /// Decides what seat `bot` does with `state`.
    ///
    /// Without a nexus the bot picks a random vacant cell in its home zone.
    /// Otherwise it plans a full turn on a scratch copy of the state.
    pub fn compute_turn(&mut self, state: &GameState, bot: usize) -> BotDecision {
        let Some(player) = state.players.get(bot) else {
            return BotDecision::Wait;
        };
        let Some(mut nexus) = player.nexus else {
            let vacant: Vec<Cell> = state
                .zone(bot)
                .cells()
                .filter(|&cell| state.unit_at(cell).is_none())
                .collect();
            return vacant
                .choose(&mut self.rng)
                .map_or(BotDecision::Wait, |&cell| BotDecision::PlaceNexus(cell));
        };
        let start = player.nexus_start.unwrap_or(nexus);
        let mut scratch = state.clone();
        let mut actions = Vec::new();

        // Movement
        self.memory.was_hit_last_turn |= state.last_nexus_hit == Some(bot);
        let already_moved = state
            .turn_actions
            .iter()
            .any(|action| matches!(action, TurnAction::MoveNexus { .. }));
        let needs_move = self.memory.was_hit_last_turn
            || !Direction::ALL
                .into_iter()
                .any(|dir| self.assess(&scratch, bot, nexus, dir) == Some(ShotQuality::Ok));
        if needs_move && !already_moved {
            if let Some(target) = self.pick_relocation(&scratch, bot, start, nexus) {
                scratch.players[bot].nexus = Some(target);
                actions.push(Intent::MoveNexus(target));
                self.memory.was_hit_last_turn = false;
                nexus = target;
            }
        }

        // Building
        let mut budget = state.turn_budget;
        let mut energy = state.energy_pool;
        for _ in 0..BUILD_ATTEMPTS {
            if budget == 0 || energy == 0 {
                break;
            }
            if self.rng.gen_bool(0.5) {
                continue;
            }
            let cell = self.random_zone_cell(&scratch, bot);
            if scratch.unit_at(cell).is_some() {
                continue;
            }
            let kind = if self.rng.gen_bool(0.5) {
                BuildingKind::Pylon
            } else {
                BuildingKind::Mirror(Direction::from_index(self.rng.gen_range(0..8)))
            };
            scratch.players[bot].buildings.push(Building::new(kind, cell));
            actions.push(Intent::Build { kind, cell });
            budget -= 1;
            energy -= 1;
        }

        // Attack
        let attack = self.pick_attack(&scratch, bot, nexus);
        debug!(bot, actions = actions.len(), ?attack, "bot planned turn");
        BotDecision::Turn(BotPlan { actions, attack })
    }

    fn assess(&self, state: &GameState, bot: usize, origin: Cell, direction: Direction) -> Option<ShotQuality> {
        let trace = trace_laser(origin, direction, state).ok()?;
        Some(classify_shot(&trace, bot, self.memory.last_hit_mirror))
    }

    fn random_zone_cell(&mut self, state: &GameState, bot: usize) -> Cell {
        let row = self.rng.gen_range(0..BOARD_ROWS);
        let col = self.rng.gen_range(state.zone(bot).columns());
        Cell::new(row, col)
    }

    fn pick_relocation(&mut self, state: &GameState, bot: usize, start: Cell, current: Cell) -> Option<Cell> {
        for _ in 0..MOVE_ATTEMPTS {
            let target = self.random_zone_cell(state, bot);
            if target == current {
                continue;
            }
            if is_valid_nexus_move(start, target, bot, state) {
                return Some(target);
            }
        }
        None
    }

    fn pick_attack(&mut self, state: &GameState, bot: usize, origin: Cell) -> Option<Direction> {
        let blocked = if self.respect_reciprocal_block {
            state.blocked_fire_direction(bot)
        } else {
            None
        };
        let mut directions = Direction::ALL;
        directions.shuffle(&mut self.rng);

        let mut first_ok = None;
        for direction in directions {
            if Some(direction) == blocked || self.assess(state, bot, origin, direction) != Some(ShotQuality::Ok) {
                continue;
            }
            if direction.col_step() == toward_opponent(bot) {
                return Some(direction);
            }
            first_ok = first_ok.or(Some(direction));
        }
        first_ok
    }
}
