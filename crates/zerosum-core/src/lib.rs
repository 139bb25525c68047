//! # Zero-Sum Defense Core
//!
//! Rules engine for a turn-based beam tactics game played on an 8×10 grid.
//!
//! Each seat defends a Nexus. On its turn a seat spends energy from a shared,
//! zero-sum pool on Pylons (which absorb beams) and Mirrors (which redirect
//! them), may shift its Nexus a few cells, and then fires a beam from the
//! Nexus in one of eight directions. Destroyed buildings return their energy to
//! the attacker, held in escrow until the attacker's next turn. A Nexus that
//! runs out of hit points loses the match.
//!
//! ## Architecture
//!
//! - [`state`]: the serializable [`GameState`] snapshot and its parts
//! - [`engine`]: [`TurnEngine`], the only component that mutates a match
//! - [`beam`], [`reflection`], [`pathfinder`], [`unit`]: pure rules queries
//! - [`bot`]: a seeded computer opponent that emits ordinary intents
//! - [`replica`]: the seam to whatever persists and broadcasts snapshots
//!
//! ## Usage
//!
//! ```
//! use zerosum_core::{Cell, Direction, Intent, MatchConfig, Participant, TurnEngine};
//!
//! let seats = vec![Participant::human("alice", "Red"), Participant::bot("cpu", "Blue")];
//! let mut engine = TurnEngine::new(MatchConfig::default(), seats)?;
//! engine.submit(0, Intent::PlaceNexus(Cell::new(4, 1)))?;
//! engine.submit(1, Intent::PlaceNexus(Cell::new(0, 9)))?;
//! engine.submit(0, Intent::EndPhase)?;
//! engine.submit(0, Intent::Fire(Direction::NE))?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod beam;
pub mod board;
pub mod bot;
pub mod config;
pub mod engine;
pub mod error;
pub mod intent;
pub mod pathfinder;
pub mod reflection;
pub mod replica;
pub mod state;
pub mod unit;

pub use beam::{trace_laser, BeamHit, BeamTrace, TraceError};
pub use board::{Cell, Direction, Zone};
pub use bot::{BotDecision, BotPlan, BotPolicy, ShotQuality};
pub use config::{ConfigError, MatchConfig, MatchMode};
pub use engine::TurnEngine;
pub use error::{EngineError, IntentError};
pub use intent::{AttackReport, Intent, Outcome};
pub use replica::{MemoryStore, SnapshotDisposition, SnapshotStore};
pub use state::{GameState, LogEntry, MatchStatus, Participant, Phase, Player};
pub use unit::{Building, BuildingKind, Unit};

#[cfg(test)]
mod tests;
