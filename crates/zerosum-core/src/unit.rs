//! Units occupying the board and the point lookup over them.
//!
//! Every cell holds at most one unit: a player's nexus or one of their
//! buildings. [`unit_at`] scans all players, nexus first, and returns a
//! [`Unit`] describing whatever it found together with the owning seat.

use serde::{Deserialize, Serialize};

use crate::board::{Cell, Direction};
use crate::state::Player;

/// Hit points of a freshly built structure.
pub const BUILDING_HP: u32 = 1;

/// Energy (and turn budget) spent on one structure in a two-player match.
pub const BUILDING_COST: u32 = 1;

/// The kind of structure a player can build.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildingKind {
    /// Absorbs any beam that reaches it.
    Pylon,
    /// Redirects beams striking its reflective face; the orientation is the
    /// direction that face points.
    Mirror(Direction),
}

impl BuildingKind {
    /// Returns true for pylons.
    #[must_use]
    pub const fn is_pylon(self) -> bool {
        matches!(self, Self::Pylon)
    }

    /// Returns the mirror orientation, if this is a mirror.
    #[must_use]
    pub const fn orientation(self) -> Option<Direction> {
        match self {
            Self::Pylon => None,
            Self::Mirror(orientation) => Some(orientation),
        }
    }
}

/// A structure owned by a player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Building {
    /// What was built.
    pub kind: BuildingKind,
    /// Where it stands.
    pub location: Cell,
    /// Remaining hit points.
    pub hp: u32,
}

impl Building {
    /// Creates a structure at full health.
    #[must_use]
    pub const fn new(kind: BuildingKind, location: Cell) -> Self {
        Self {
            kind,
            location,
            hp: BUILDING_HP,
        }
    }
}

/// Whatever occupies a cell, tagged with its owner.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Unit {
    /// A player's core.
    Nexus {
        /// Owning seat.
        owner: usize,
        /// Current hit points.
        hp: u32,
        /// Cell the nexus stands on.
        location: Cell,
    },
    /// An absorbing structure.
    Pylon {
        /// Owning seat.
        owner: usize,
        /// Current hit points.
        hp: u32,
        /// Cell the pylon stands on.
        location: Cell,
    },
    /// A reflecting structure.
    Mirror {
        /// Owning seat.
        owner: usize,
        /// Current hit points.
        hp: u32,
        /// Cell the mirror stands on.
        location: Cell,
        /// Direction the reflective face points.
        orientation: Direction,
    },
}

impl Unit {
    fn from_building(owner: usize, building: &Building) -> Self {
        match building.kind {
            BuildingKind::Pylon => Self::Pylon {
                owner,
                hp: building.hp,
                location: building.location,
            },
            BuildingKind::Mirror(orientation) => Self::Mirror {
                owner,
                hp: building.hp,
                location: building.location,
                orientation,
            },
        }
    }

    /// Returns the owning seat.
    #[must_use]
    pub const fn owner(&self) -> usize {
        match *self {
            Self::Nexus { owner, .. } | Self::Pylon { owner, .. } | Self::Mirror { owner, .. } => {
                owner
            }
        }
    }

    /// Returns the unit's hit points.
    #[must_use]
    pub const fn hp(&self) -> u32 {
        match *self {
            Self::Nexus { hp, .. } | Self::Pylon { hp, .. } | Self::Mirror { hp, .. } => hp,
        }
    }

    /// Returns the cell the unit occupies.
    #[must_use]
    pub const fn location(&self) -> Cell {
        match *self {
            Self::Nexus { location, .. }
            | Self::Pylon { location, .. }
            | Self::Mirror { location, .. } => location,
        }
    }

    /// Returns true for a nexus.
    #[must_use]
    pub const fn is_nexus(&self) -> bool {
        matches!(self, Self::Nexus { .. })
    }

    /// Returns true if this is the nexus of `player`.
    #[must_use]
    pub const fn is_nexus_of(&self, player: usize) -> bool {
        matches!(*self, Self::Nexus { owner, .. } if owner == player)
    }

    /// Returns true for pylons and mirrors.
    #[must_use]
    pub const fn is_building(&self) -> bool {
        !self.is_nexus()
    }

    /// Short noun used in log lines.
    #[must_use]
    pub const fn noun(&self) -> &'static str {
        match self {
            Self::Nexus { .. } => "Nexus",
            Self::Pylon { .. } => "Pylon",
            Self::Mirror { .. } => "Mirror",
        }
    }
}

/// Finds the unit standing on `cell`.
///
/// Players are scanned in seat order, each nexus before that player's
/// buildings; the first match wins.
#[must_use]
pub fn unit_at(players: &[Player], cell: Cell) -> Option<Unit> {
    for (owner, player) in players.iter().enumerate() {
        if player.nexus == Some(cell) {
            return Some(Unit::Nexus {
                owner,
                hp: player.nexus_hp,
                location: cell,
            });
        }
        if let Some(building) = player.buildings.iter().find(|b| b.location == cell) {
            return Some(Unit::from_building(owner, building));
        }
    }
    None
}
