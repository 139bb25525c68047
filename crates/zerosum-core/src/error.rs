//! Error types returned by the turn engine.
//!
//! A rejected intent leaves the match untouched and is reported only to the
//! issuer. A [`TraceError`] means the board geometry produced a beam that
//! never resolved; the engine refuses the shot rather than guessing.

use thiserror::Error;

use crate::beam::TraceError;
use crate::board::Cell;
use crate::state::Phase;

/// Why an intent was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntentError {
    /// The match has ended or was abandoned.
    #[error("the match is over")]
    MatchOver,

    /// The intent is not valid in the current phase.
    #[error("not allowed during the {phase} phase")]
    WrongPhase {
        /// Phase the match is in.
        phase: Phase,
    },

    /// Someone other than the acting seat issued a turn intent.
    #[error("it is seat {expected}'s turn, not seat {actual}'s")]
    NotYourTurn {
        /// Seat whose turn it is.
        expected: usize,
        /// Seat that issued the intent.
        actual: usize,
    },

    /// The seat index does not exist.
    #[error("no seat {0} in this match")]
    UnknownPlayer(usize),

    /// The cell lies outside the board.
    #[error("{0} is off the board")]
    OutOfBounds(Cell),

    /// The cell lies outside the actor's home half.
    #[error("{0} is outside your zone")]
    OutOfZone(Cell),

    /// The cell already holds a unit.
    #[error("{0} is occupied")]
    Occupied(Cell),

    /// The actor placed its nexus already.
    #[error("nexus already placed")]
    NexusAlreadyPlaced,

    /// The actor has no nexus on the board.
    #[error("nexus not placed")]
    NexusNotPlaced,

    /// Not enough turn budget or pooled energy to build.
    #[error("insufficient budget or energy")]
    InsufficientFunds,

    /// The nexus was already relocated this turn.
    #[error("nexus already moved this turn")]
    AlreadyMoved,

    /// The destination is unreachable within range or otherwise illegal.
    #[error("cannot move nexus to {0}")]
    InvalidMove(Cell),

    /// Firing straight back along the shot that last struck this nexus.
    #[error("return fire along the incoming shot is blocked")]
    ReciprocalBlocked,
}

/// Everything [`crate::engine::TurnEngine::submit`] can fail with.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The intent was refused; state is unchanged.
    #[error("invalid intent: {0}")]
    InvalidIntent(#[from] IntentError),

    /// The board produced a beam that did not resolve; state is unchanged.
    #[error("inconsistent configuration: {0}")]
    Inconsistent(#[from] TraceError),
}

impl EngineError {
    /// The intent rejection, if that is what this is.
    #[must_use]
    pub fn as_intent(&self) -> Option<&IntentError> {
        match self {
            Self::InvalidIntent(err) => Some(err),
            Self::Inconsistent(_) => None,
        }
    }
}
