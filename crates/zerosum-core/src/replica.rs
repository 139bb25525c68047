//! Snapshot replication seam.
//!
//! After every accepted transition the host hands the authoritative state to
//! a [`SnapshotStore`], which persists and fans it out. Snapshots coming back
//! the other way go through [`crate::engine::TurnEngine::receive`], which
//! keeps the newest by [`GameState::revision`] and drops the rest.
//!
//! # Example
//!
//! ```
//! use zerosum_core::replica::{MemoryStore, SnapshotStore};
//! use zerosum_core::state::{GameState, Participant, Player};
//!
//! let state = GameState::new(vec![Player::new(Participant::human("solo", "Red"), 3)], 10, 3);
//! let mut store = MemoryStore::new();
//! store.publish(&state);
//! assert_eq!(store.latest(), Some(&state));
//! ```

use serde::{Deserialize, Serialize};

use crate::state::GameState;

/// Persistence and notification collaborator.
///
/// # Implementation Guidelines
///
/// Stores receive full snapshots, never deltas, and must not assume they
/// arrive in revision order; readers compare revisions themselves.
pub trait SnapshotStore {
    /// Accepts a post-transition snapshot.
    fn publish(&mut self, snapshot: &GameState);
}

/// What [`crate::engine::TurnEngine::receive`] did with an inbound snapshot.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SnapshotDisposition {
    /// Local state was replaced wholesale.
    Applied,
    /// The snapshot was no newer than local state and was discarded.
    Stale {
        /// Revision held locally.
        local: u64,
        /// Revision received.
        received: u64,
    },
}

/// In-process store keeping every published snapshot.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    history: Vec<GameState>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recently published snapshot.
    #[must_use]
    pub fn latest(&self) -> Option<&GameState> {
        self.history.last()
    }

    /// Every snapshot in publication order.
    #[must_use]
    pub fn history(&self) -> &[GameState] {
        &self.history
    }

    /// Number of snapshots published.
    #[must_use]
    pub fn len(&self) -> usize {
        self.history.len()
    }

    /// Returns true if nothing was published yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }
}

impl SnapshotStore for MemoryStore {
    fn publish(&mut self, snapshot: &GameState) {
        self.history.push(snapshot.clone());
    }
}
