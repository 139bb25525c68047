//! Player intents and what the engine reports back for them.
//!
//! Hosts translate gestures (or bot plans) into [`Intent`]s and submit them
//! to [`crate::engine::TurnEngine::submit`]. Every accepted intent yields an
//! [`Outcome`]; rejected ones leave the match untouched.

use serde::{Deserialize, Serialize};

use crate::beam::BeamTrace;
use crate::board::{Cell, Direction};
use crate::state::Phase;
use crate::unit::BuildingKind;

/// Something a seat asks the engine to do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Intent {
    /// Setup: place this seat's nexus.
    PlaceNexus(Cell),
    /// BuyMove: build a structure, replacing one staged on the same cell this turn.
    Build {
        /// Pylon or oriented mirror.
        kind: BuildingKind,
        /// Target cell.
        cell: Cell,
    },
    /// BuyMove: relocate the nexus, once per turn.
    MoveNexus(Cell),
    /// BuyMove: proceed to the attack phase.
    EndPhase,
    /// Attack: go back to building.
    CancelAttack,
    /// BuyMove or Attack: discard everything staged this turn.
    ResetTurn,
    /// BuyMove: pass the turn without attacking.
    EndTurn,
    /// Attack: fire from the nexus.
    Fire(Direction),
    /// Attack: pass without firing.
    Skip,
}

/// Result of resolving a `Fire`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackReport {
    /// The beam as traced.
    pub trace: BeamTrace,
    /// Buildings removed, credited to the shooter's escrow.
    pub destroyed: u32,
    /// Escrow released into the pool for the next seat.
    pub released: u32,
    /// Set when the shot ended the match.
    pub winner: Option<usize>,
}

/// What an accepted intent did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// A nexus was placed; `setup_complete` once every seat has one.
    NexusPlaced {
        /// Whether play has started.
        setup_complete: bool,
    },
    /// A structure was built.
    Built {
        /// Cost refunded from a replaced structure staged this turn.
        refunded: u32,
    },
    /// The nexus moved this many steps from its turn-start cell.
    NexusMoved {
        /// Path length from the turn-start cell.
        distance: u32,
    },
    /// The phase changed without ending the turn.
    PhaseChanged(Phase),
    /// The turn was rolled back to its starting snapshot.
    TurnReset,
    /// A shot was resolved.
    Fired(AttackReport),
    /// The turn passed without a shot.
    TurnPassed {
        /// Seat now acting.
        next: usize,
        /// Escrow released into the pool.
        released: u32,
    },
}
