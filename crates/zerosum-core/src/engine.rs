//! The turn engine: sole owner and mutator of a match's [`GameState`].
//!
//! Play moves through `Setup → BuyMove → Attack → (BuyMove | GameOver)`.
//!
//! - **Setup**: every seat places its nexus. The last placement fills the
//!   energy pool and hands seat 0 its first turn.
//! - **BuyMove**: the acting seat builds (one energy and one budget point per
//!   structure, free in sandbox) and may relocate its nexus once. Everything
//!   staged here can be rolled back with [`Intent::ResetTurn`].
//! - **Attack**: the acting seat fires or skips. Destroyed buildings go into the
//!   shooter's escrow; a nexus reduced to zero ends the match.
//!
//! Passing the turn releases the next seat's escrow into the pool and sets its
//! budget to `min(pylons + 1, pool)`.
//!
//! Every intent is validated before anything is touched, so a rejected intent
//! (or a shot whose beam fails to resolve) leaves the state exactly as it was.
//! Each accepted transition bumps [`GameState::revision`].
//!
//! # Example
//!
//! ```
//! use zerosum_core::board::{Cell, Direction};
//! use zerosum_core::config::MatchConfig;
//! use zerosum_core::engine::TurnEngine;
//! use zerosum_core::intent::{Intent, Outcome};
//! use zerosum_core::state::{Participant, Phase};
//!
//! let seats = vec![Participant::human("alice", "Red"), Participant::human("bob", "Blue")];
//! let mut engine = TurnEngine::new(MatchConfig::default(), seats).unwrap();
//!
//! engine.submit(0, Intent::PlaceNexus(Cell::new(3, 1))).unwrap();
//! engine.submit(1, Intent::PlaceNexus(Cell::new(3, 8))).unwrap();
//! assert_eq!(engine.state().phase, Phase::BuyMove);
//!
//! engine.submit(0, Intent::EndPhase).unwrap();
//! let outcome = engine.submit(0, Intent::Fire(Direction::E)).unwrap();
//! assert!(matches!(outcome, Outcome::Fired(_)));
//! assert_eq!(engine.state().players[1].nexus_hp, 2);
//! assert_eq!(engine.state().turn, 1);
//! ```

use std::mem;

use tracing::{debug, info, instrument, warn};

use crate::beam::trace_laser;
use crate::board::{Cell, Direction};
use crate::config::{ConfigError, MatchConfig};
use crate::error::{EngineError, IntentError};
use crate::intent::{AttackReport, Intent, Outcome};
use crate::pathfinder::{find_shortest_path, is_valid_nexus_move};
use crate::replica::{SnapshotDisposition, SnapshotStore};
use crate::state::{GameState, LogEntry, MatchStatus, Participant, Phase, Player, TurnAction, SANDBOX_TURN_BUDGET};
use crate::unit::{Building, BuildingKind, Unit, BUILDING_COST};

/// Authoritative state machine for one match.
#[derive(Debug, Clone)]
pub struct TurnEngine {
    /// Current state.
    state: GameState,
    /// State as it stood when the current turn began.
    turn_start: GameState,
    /// Settings fixed at creation.
    config: MatchConfig,
}

impl TurnEngine {
    /// Seats `participants` in order and opens the setup phase.
    ///
    /// Bot seats are renamed `Bot (<difficulty>)` when the configuration
    /// carries a difficulty label.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration does not fit the seats.
    pub fn new(config: MatchConfig, participants: Vec<Participant>) -> Result<Self, ConfigError> {
        config.validate(participants.len())?;

        let players = participants
            .into_iter()
            .map(|mut participant| {
                if let (true, Some(label)) = (participant.is_bot, &config.bot_difficulty) {
                    participant.display_name = format!("Bot ({label})");
                }
                Player::new(participant, config.nexus_hp)
            })
            .collect();
        let state = GameState::new(players, config.max_energy, config.nexus_hp);

        info!(mode = ?config.mode, max_energy = config.max_energy, nexus_hp = config.nexus_hp, "match created");
        Ok(Self {
            turn_start: state.clone(),
            state,
            config,
        })
    }

    /// Resumes a match from a persisted snapshot.
    ///
    /// Actions the snapshot has staged this turn are unwound to recover the
    /// point [`Intent::ResetTurn`] returns to.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the snapshot's seats do not fit the configuration.
    pub fn resume(config: MatchConfig, state: GameState) -> Result<Self, ConfigError> {
        config.validate(state.players.len())?;
        Ok(Self {
            turn_start: pre_turn_state(&state),
            state,
            config,
        })
    }

    /// The authoritative state.
    #[must_use]
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// An owned copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> GameState {
        self.state.clone()
    }

    /// The configuration the match was created with.
    #[must_use]
    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Hands the current state to `store`.
    pub fn publish_to(&self, store: &mut dyn SnapshotStore) {
        store.publish(&self.state);
    }

    /// Replaces local state with an inbound snapshot if it is newer.
    ///
    /// The reset point becomes the received snapshot with its staged actions
    /// unwound.
    pub fn receive(&mut self, snapshot: GameState) -> SnapshotDisposition {
        let local = self.state.revision;
        if snapshot.revision <= local {
            warn!(local, received = snapshot.revision, "discarding stale snapshot");
            return SnapshotDisposition::Stale {
                local,
                received: snapshot.revision,
            };
        }
        debug!(local, received = snapshot.revision, "applying snapshot");
        self.turn_start = pre_turn_state(&snapshot);
        self.state = snapshot;
        SnapshotDisposition::Applied
    }

    /// Applies one intent on behalf of seat `actor`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidIntent`] when the intent is not legal right
    /// now and [`EngineError::Inconsistent`] when a shot fails to resolve. In
    /// both cases the state is unchanged.
    #[instrument(level = "debug", skip(self), fields(revision = self.state.revision))]
    pub fn submit(&mut self, actor: usize, intent: Intent) -> Result<Outcome, EngineError> {
        match self.apply(actor, intent) {
            Ok(outcome) => {
                self.state.revision += 1;
                debug!(revision = self.state.revision, "intent accepted");
                Ok(outcome)
            }
            Err(err) => {
                debug!(%err, "intent rejected");
                Err(err)
            }
        }
    }

    /// Ends the match without a winner because `player` left.
    ///
    /// # Errors
    ///
    /// Returns [`IntentError::UnknownPlayer`] for a missing seat and
    /// [`IntentError::MatchOver`] if the match already ended.
    pub fn abandon(&mut self, player: usize) -> Result<(), IntentError> {
        let name = self
            .state
            .players
            .get(player)
            .map(|p| p.display_name.clone())
            .ok_or(IntentError::UnknownPlayer(player))?;
        if self.state.is_over() {
            return Err(IntentError::MatchOver);
        }

        self.state.status = MatchStatus::Abandoned;
        self.state.phase = Phase::GameOver;
        self.state.winner = None;
        self.state.push_log(LogEntry::public(format!("{name} left the match.")));
        self.state.revision += 1;
        info!(player, "match abandoned");
        Ok(())
    }

    /// Clears the board and returns every seat to setup.
    pub fn restart(&mut self) {
        let max_hp = self.state.max_nexus_hp;
        for player in &mut self.state.players {
            player.nexus = None;
            player.nexus_start = None;
            player.nexus_hp = max_hp;
            player.buildings.clear();
            player.escrow = 0;
            player.is_ready = false;
        }

        let state = &mut self.state;
        state.turn = 0;
        state.phase = Phase::Setup;
        state.status = MatchStatus::InProgress;
        state.winner = None;
        state.energy_pool = state.max_energy;
        state.turn_budget = 0;
        state.turn_actions.clear();
        state.last_shot_vector = None;
        state.last_laser_path = None;
        state.last_nexus_hit = None;
        state.log = vec![LogEntry::public("Game started! State reset.")];
        state.revision += 1;

        self.turn_start = self.state.clone();
        info!("match restarted");
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    fn apply(&mut self, actor: usize, intent: Intent) -> Result<Outcome, EngineError> {
        if self.state.is_over() {
            return Err(IntentError::MatchOver.into());
        }
        if actor >= self.state.players.len() {
            return Err(IntentError::UnknownPlayer(actor).into());
        }

        let outcome = match intent {
            Intent::PlaceNexus(cell) => self.place_nexus(actor, cell)?,
            Intent::Build { kind, cell } => self.build(actor, kind, cell)?,
            Intent::MoveNexus(cell) => self.move_nexus(actor, cell)?,
            Intent::EndPhase => {
                self.expect_turn(actor, &[Phase::BuyMove])?;
                self.set_phase(Phase::Attack);
                Outcome::PhaseChanged(Phase::Attack)
            }
            Intent::CancelAttack => {
                self.expect_turn(actor, &[Phase::Attack])?;
                self.set_phase(Phase::BuyMove);
                Outcome::PhaseChanged(Phase::BuyMove)
            }
            Intent::ResetTurn => {
                self.expect_turn(actor, &[Phase::BuyMove, Phase::Attack])?;
                self.reset_turn();
                Outcome::TurnReset
            }
            Intent::EndTurn => {
                self.expect_turn(actor, &[Phase::BuyMove])?;
                let name = &self.state.players[actor].display_name;
                let line = LogEntry::public(format!("{name} ended turn."));
                self.state.push_log(line);
                self.pass_without_shot()
            }
            Intent::Skip => {
                self.expect_turn(actor, &[Phase::Attack])?;
                self.state.push_log(LogEntry::public("Attack skipped."));
                self.pass_without_shot()
            }
            Intent::Fire(direction) => Outcome::Fired(self.fire(actor, direction)?),
        };
        Ok(outcome)
    }

    fn expect_turn(&self, actor: usize, phases: &[Phase]) -> Result<(), IntentError> {
        if !phases.contains(&self.state.phase) {
            return Err(IntentError::WrongPhase {
                phase: self.state.phase,
            });
        }
        if actor != self.state.turn {
            return Err(IntentError::NotYourTurn {
                expected: self.state.turn,
                actual: actor,
            });
        }
        Ok(())
    }

    fn set_phase(&mut self, phase: Phase) {
        info!(from = %self.state.phase, to = %phase, turn = self.state.turn, "phase changed");
        self.state.phase = phase;
    }

    // =========================================================================
    // Setup
    // =========================================================================

    fn place_nexus(&mut self, actor: usize, cell: Cell) -> Result<Outcome, IntentError> {
        if self.state.phase != Phase::Setup {
            return Err(IntentError::WrongPhase {
                phase: self.state.phase,
            });
        }
        if !cell.in_bounds() {
            return Err(IntentError::OutOfBounds(cell));
        }
        if self.state.players[actor].nexus.is_some() {
            return Err(IntentError::NexusAlreadyPlaced);
        }
        if !self.state.zone(actor).contains(cell) {
            return Err(IntentError::OutOfZone(cell));
        }
        if self.state.unit_at(cell).is_some() {
            return Err(IntentError::Occupied(cell));
        }

        let player = &mut self.state.players[actor];
        player.nexus = Some(cell);
        player.nexus_start = Some(cell);
        self.state.push_log(LogEntry::public("Nexus placed."));

        let setup_complete = self.state.players.iter().all(|p| p.nexus.is_some());
        if setup_complete {
            self.begin_play();
        }
        Ok(Outcome::NexusPlaced { setup_complete })
    }

    fn begin_play(&mut self) {
        let state = &mut self.state;
        for player in &mut state.players {
            player.nexus_start = player.nexus;
        }
        state.turn = 0;
        state.energy_pool = state.max_energy;
        state.turn_budget = if state.is_sandbox() {
            SANDBOX_TURN_BUDGET
        } else {
            state.energy_pool.min(1)
        };
        state.turn_actions.clear();
        state.push_log(LogEntry::public("All Nexus placed. Phase: Buy/Move"));
        self.set_phase(Phase::BuyMove);
        self.turn_start = self.state.clone();
    }

    // =========================================================================
    // BuyMove
    // =========================================================================

    fn build(&mut self, actor: usize, kind: BuildingKind, cell: Cell) -> Result<Outcome, IntentError> {
        self.expect_turn(actor, &[Phase::BuyMove])?;
        if !cell.in_bounds() {
            return Err(IntentError::OutOfBounds(cell));
        }
        if !self.state.zone(actor).contains(cell) {
            return Err(IntentError::OutOfZone(cell));
        }

        let staged = self.state.turn_actions.iter().position(
            |action| matches!(action, TurnAction::Build { location, .. } if *location == cell),
        );
        let refund = match staged {
            Some(index) => match self.state.turn_actions[index] {
                TurnAction::Build { cost, .. } => cost,
                TurnAction::MoveNexus { .. } => 0,
            },
            None => {
                if self.state.unit_at(cell).is_some() {
                    return Err(IntentError::Occupied(cell));
                }
                0
            }
        };

        let sandbox = self.state.is_sandbox();
        let budget = self.state.turn_budget + refund;
        let pool = self.state.energy_pool + refund;
        if !sandbox && (budget < BUILDING_COST || pool < BUILDING_COST) {
            return Err(IntentError::InsufficientFunds);
        }
        let cost = if sandbox { 0 } else { BUILDING_COST };

        if let Some(index) = staged {
            self.state.turn_actions.remove(index);
            self.state.players[actor].remove_building_at(cell);
        }
        self.state.players[actor].buildings.push(Building::new(kind, cell));
        self.state.turn_budget = budget - cost;
        self.state.energy_pool = pool - cost;
        self.state.turn_actions.push(TurnAction::Build {
            kind,
            location: cell,
            cost,
        });
        debug!(%cell, ?kind, cost, refund, "structure built");
        Ok(Outcome::Built { refunded: refund })
    }

    fn move_nexus(&mut self, actor: usize, target: Cell) -> Result<Outcome, IntentError> {
        self.expect_turn(actor, &[Phase::BuyMove])?;
        if self
            .state
            .turn_actions
            .iter()
            .any(|action| matches!(action, TurnAction::MoveNexus { .. }))
        {
            return Err(IntentError::AlreadyMoved);
        }
        let player = &self.state.players[actor];
        let current = player.nexus.ok_or(IntentError::NexusNotPlaced)?;
        let start = player.nexus_start.unwrap_or(current);

        if !target.in_bounds() {
            return Err(IntentError::OutOfBounds(target));
        }
        if !self.state.zone(actor).contains(target) {
            return Err(IntentError::OutOfZone(target));
        }
        if let Some(unit) = self.state.unit_at(target) {
            if !unit.is_nexus_of(actor) {
                return Err(IntentError::Occupied(target));
            }
        }
        if !is_valid_nexus_move(start, target, actor, &self.state) {
            return Err(IntentError::InvalidMove(target));
        }
        let distance = find_shortest_path(start, target, &self.state, actor).unwrap_or_default();

        self.state.players[actor].nexus = Some(target);
        self.state.turn_actions.push(TurnAction::MoveNexus {
            from: current,
            to: target,
        });
        debug!(from = %current, to = %target, distance, "nexus moved");
        Ok(Outcome::NexusMoved { distance })
    }

    fn reset_turn(&mut self) {
        let revision = self.state.revision;
        self.state = self.turn_start.clone();
        self.state.revision = revision;
        debug!(turn = self.state.turn, "turn reset");
    }

    // =========================================================================
    // Attack
    // =========================================================================

    fn fire(&mut self, actor: usize, direction: Direction) -> Result<AttackReport, EngineError> {
        self.expect_turn(actor, &[Phase::Attack])?;
        let origin = self.state.players[actor]
            .nexus
            .ok_or(IntentError::NexusNotPlaced)?;
        if self.config.enforce_reciprocal_block
            && self.state.blocked_fire_direction(actor) == Some(direction)
        {
            return Err(IntentError::ReciprocalBlocked.into());
        }

        let trace = trace_laser(origin, direction, &self.state)?;

        let mut destroyed = 0;
        let mut struck = None;
        let mut fallen = None;
        for hit in &trace.hits {
            match hit.unit {
                Unit::Nexus { owner, .. } => {
                    let target = &mut self.state.players[owner];
                    target.nexus_hp = target.nexus_hp.saturating_sub(1);
                    struck = Some(owner);
                    if target.nexus_hp == 0 {
                        fallen = Some(owner);
                    }
                }
                Unit::Pylon { owner, location, .. } | Unit::Mirror { owner, location, .. } => {
                    if self.state.players[owner].remove_building_at(location).is_some() {
                        destroyed += 1;
                    }
                }
            }
        }

        let state = &mut self.state;
        state.players[actor].escrow += destroyed;
        state.log.extend(trace.log.iter().cloned());
        state.last_shot_vector = Some(direction);
        state.last_laser_path = Some(trace.path.clone());
        state.last_nexus_hit = struck;
        info!(actor, %direction, hits = trace.hits.len(), destroyed, "shot resolved");

        let (released, winner) = match fallen {
            Some(loser) => {
                let winner = state.opponent_of(loser);
                state.winner = Some(winner);
                state.status = MatchStatus::GameOver;
                state.push_log(LogEntry::public("GAME OVER!"));
                self.set_phase(Phase::GameOver);
                info!(winner, loser, "match over");
                (0, Some(winner))
            }
            None => (self.advance_turn(), None),
        };

        Ok(AttackReport {
            trace,
            destroyed,
            released,
            winner,
        })
    }

    fn pass_without_shot(&mut self) -> Outcome {
        self.state.last_shot_vector = None;
        self.state.last_laser_path = None;
        self.state.last_nexus_hit = None;
        let released = self.advance_turn();
        Outcome::TurnPassed {
            next: self.state.turn,
            released,
        }
    }

    /// Hands the turn to the next seat, releasing its escrow. Returns the
    /// amount released.
    fn advance_turn(&mut self) -> u32 {
        let state = &mut self.state;
        let next = state.next_turn();
        let sandbox = state.is_sandbox();

        let player = &mut state.players[next];
        player.nexus_start = player.nexus;
        let released = mem::take(&mut player.escrow);
        let pylons = u32::try_from(player.pylon_count()).unwrap_or(u32::MAX);

        state.energy_pool += released;
        state.turn_budget = if sandbox {
            SANDBOX_TURN_BUDGET
        } else {
            pylons.saturating_add(1).min(state.energy_pool)
        };
        state.turn = next;
        state.turn_actions.clear();
        self.set_phase(Phase::BuyMove);
        self.turn_start = self.state.clone();

        debug!(
            turn = next,
            released,
            pool = self.state.energy_pool,
            budget = self.state.turn_budget,
            "turn passed"
        );
        released
    }
}

/// Rebuilds the state as it stood when the current turn began by undoing the
/// staged actions in reverse.
fn pre_turn_state(snapshot: &GameState) -> GameState {
    let mut state = snapshot.clone();
    if !matches!(state.phase, Phase::BuyMove | Phase::Attack) {
        return state;
    }
    let actor = state.turn;
    for action in mem::take(&mut state.turn_actions).into_iter().rev() {
        match action {
            TurnAction::Build { location, cost, .. } => {
                if let Some(player) = state.players.get_mut(actor) {
                    player.remove_building_at(location);
                }
                state.energy_pool += cost;
                state.turn_budget += cost;
            }
            TurnAction::MoveNexus { from, .. } => {
                if let Some(player) = state.players.get_mut(actor) {
                    player.nexus = Some(from);
                }
            }
        }
    }
    state.phase = Phase::BuyMove;
    state
}

// =============================================================================
// Tests
// =============================================================================
