//! Beam tracing: the ray march behind every attack.
//!
//! A beam leaves the shooter's nexus and advances one cell per step. It
//! escapes through the left and right edges, and through the top and bottom
//! edges when travelling straight up or down. A diagonal beam meeting the top
//! or bottom edge bounces: it stays on the last row, slides one column onward,
//! and continues with its row component flipped.
//!
//! The first unit in the beam's way decides its fate: a nexus or pylon absorbs
//! it, a mirror either redirects it (see [`crate::reflection`]) or is struck.
//!
//! Tracing only borrows the state, so hypothetical shots are free to evaluate;
//! applying the hits is the turn engine's job.
//!
//! # Example
//!
//! ```
//! use zerosum_core::beam::trace_laser;
//! use zerosum_core::board::{Cell, Direction};
//! use zerosum_core::state::{GameState, Participant, Player};
//!
//! let mut players = vec![
//!     Player::new(Participant::human("a", "Red"), 3),
//!     Player::new(Participant::human("b", "Blue"), 3),
//! ];
//! players[0].nexus = Some(Cell::new(2, 1));
//! players[1].nexus = Some(Cell::new(2, 8));
//! let state = GameState::new(players, 10, 3);
//!
//! let trace = trace_laser(Cell::new(2, 1), Direction::E, &state).unwrap();
//! assert!(trace.struck_nexus_of(1));
//! assert_eq!(trace.path.last(), Some(&Cell::new(2, 8)));
//! ```

use glam::IVec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, trace};

use crate::board::{col_in_bounds, row_in_bounds, zone_owner, Cell, Direction};
use crate::reflection::{reflect, Reflection};
use crate::state::{GameState, LogEntry};
use crate::unit::Unit;

/// Step limit for a single beam. A chain of mirrors can fold a beam into a
/// longer path than this; such a shot is refused rather than resolved.
pub const MAX_BEAM_STEPS: u32 = 40;

/// A unit struck by a beam.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeamHit {
    /// The unit as it stood before the hit.
    pub unit: Unit,
    /// Its hit points after this beam, in the trace's own accounting.
    pub remaining_hp: u32,
}

/// Everything a single shot did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeamTrace {
    /// Nexus cell the beam started from.
    pub origin: Cell,
    /// Direction it was fired in.
    pub direction: Direction,
    /// On-board cells visited, starting with `origin`.
    pub path: Vec<Cell>,
    /// Units struck, in order.
    pub hits: Vec<BeamHit>,
    /// Audience-tagged narration of the shot.
    pub log: Vec<LogEntry>,
    /// Off-board position where the beam escaped, if it did.
    pub exit: Option<IVec2>,
    /// Number of top/bottom edge bounces.
    pub boundary_bounces: u32,
}

impl BeamTrace {
    fn new(origin: Cell, direction: Direction) -> Self {
        Self {
            origin,
            direction,
            path: vec![origin],
            hits: Vec::new(),
            log: Vec::new(),
            exit: None,
            boundary_bounces: 0,
        }
    }

    /// Returns true if the beam hit `player`'s nexus.
    #[must_use]
    pub fn struck_nexus_of(&self, player: usize) -> bool {
        self.hits.iter().any(|hit| hit.unit.is_nexus_of(player))
    }

    /// Number of buildings struck.
    #[must_use]
    pub fn destroyed_buildings(&self) -> u32 {
        let count = self.hits.iter().filter(|hit| hit.unit.is_building()).count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    /// Location of the first mirror the beam destroyed.
    #[must_use]
    pub fn first_mirror_hit(&self) -> Option<Cell> {
        self.hits.iter().find_map(|hit| match hit.unit {
            Unit::Mirror { location, .. } => Some(location),
            _ => None,
        })
    }

    /// Where the beam finished: its exit point, or the last cell it reached.
    #[must_use]
    pub fn end_position(&self) -> IVec2 {
        self.exit.unwrap_or_else(|| {
            self.path
                .last()
                .map_or_else(|| self.origin.as_ivec2(), |cell| cell.as_ivec2())
        })
    }

    fn escape(&mut self, at: IVec2) {
        self.exit = Some(at);
        self.log.push(LogEntry::public("Laser escaped the system (MISS)."));
    }
}

/// A beam that never resolved.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TraceError {
    /// The step limit ran out before the beam escaped or hit anything.
    #[error("beam from {origin} heading {direction} did not resolve within {steps} steps")]
    StepBudgetExhausted {
        /// Firing cell.
        origin: Cell,
        /// Firing direction.
        direction: Direction,
        /// Steps taken.
        steps: u32,
    },
}

/// Traces a beam fired from `origin` towards `direction`.
///
/// # Errors
///
/// Returns [`TraceError::StepBudgetExhausted`] if the beam is still travelling
/// after [`MAX_BEAM_STEPS`] steps.
pub fn trace_laser(origin: Cell, direction: Direction, state: &GameState) -> Result<BeamTrace, TraceError> {
    let mut beam = BeamTrace::new(origin, direction);
    let mut pos = origin.as_ivec2();
    let mut heading = direction;

    for _ in 0..MAX_BEAM_STEPS {
        let mut next = pos + heading.delta();

        if !col_in_bounds(next.x) {
            beam.escape(next);
            return Ok(beam);
        }

        if !row_in_bounds(next.y) {
            if heading.col_step() == 0 {
                beam.escape(next);
                return Ok(beam);
            }
            // `pos` is always on the board here.
            let last_col = u8::try_from(pos.x).unwrap_or_default();
            let owner = zone_owner(last_col, state.players.len());
            beam.log
                .push(LogEntry::private(owner, "Laser reflected off side boundary."));
            beam.boundary_bounces += 1;

            // Column was already checked; only the row is reverted.
            next.y = pos.y;
            heading = heading.with_row_flipped();
        }

        let Some(cell) = Cell::from_ivec2(next) else {
            beam.escape(next);
            return Ok(beam);
        };
        pos = next;
        beam.path.push(cell);
        trace!(%cell, %heading, "beam step");

        let Some(unit) = state.unit_at(cell) else {
            continue;
        };
        let owner_name = &state.players[unit.owner()].display_name;
        match unit {
            Unit::Nexus { .. } | Unit::Pylon { .. } => {
                record_hit(&mut beam, unit, owner_name);
                return Ok(beam);
            }
            Unit::Mirror { orientation, .. } => match reflect(orientation, heading) {
                Reflection::Destroy => {
                    record_hit(&mut beam, unit, owner_name);
                    return Ok(beam);
                }
                Reflection::Redirect(out) => {
                    beam.log.push(LogEntry::private(
                        unit.owner(),
                        format!("REFLECT off {owner_name}'s Mirror!"),
                    ));
                    heading = out;
                }
            },
        }
    }

    error!(%origin, %direction, "beam exhausted its step budget");
    Err(TraceError::StepBudgetExhausted {
        origin,
        direction,
        steps: MAX_BEAM_STEPS,
    })
}

fn record_hit(beam: &mut BeamTrace, unit: Unit, owner_name: &str) {
    beam.log
        .push(LogEntry::public(format!("HIT {owner_name}'s {}!", unit.noun())));
    beam.hits.push(BeamHit {
        unit,
        remaining_hp: unit.hp().saturating_sub(1),
    });
}

// =============================================================================
// Tests
// =============================================================================
