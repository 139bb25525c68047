//! Board geometry: cells, the eight beam directions, and home zones.
//!
//! The board is a fixed 8×10 grid addressed as `(row, col)` with row 0 at the
//! top. Directions are expressed as [`IVec2`] deltas using screen conventions:
//! `x` is the column step and `y` is the row step, so north is `(0, -1)`.
//!
//! # Zones
//!
//! In two-player matches the board is split down the middle by column. Seat 0
//! owns columns `0..5` and seat 1 owns columns `5..10`. A sandbox match has a
//! single seat that owns the whole board.
//!
//! ```
//! use zerosum_core::board::{Cell, Direction, Zone};
//!
//! let cell = Cell::new(4, 2);
//! assert_eq!(cell.step(Direction::E), Some(Cell::new(4, 3)));
//! assert!(Zone::for_player(0, 2).contains(cell));
//! assert!(!Zone::for_player(1, 2).contains(cell));
//! ```

use std::fmt;
use std::ops::Range;

use glam::IVec2;
use serde::{Deserialize, Serialize};

/// Number of rows on the board.
pub const BOARD_ROWS: u8 = 8;

/// Number of columns on the board.
pub const BOARD_COLS: u8 = 10;

/// First column of the right-hand home zone in two-player matches.
pub const ZONE_SPLIT_COL: u8 = BOARD_COLS / 2;

// =============================================================================
// Cell
// =============================================================================

/// A board coordinate.
///
/// Constructing a `Cell` does not check bounds; use [`Cell::in_bounds`] or
/// [`Cell::from_ivec2`] when the coordinate comes from arithmetic.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Cell {
    /// Row index, 0 at the top.
    pub row: u8,
    /// Column index, 0 at the left.
    pub col: u8,
}

impl Cell {
    /// Creates a cell at `(row, col)`.
    #[must_use]
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    /// Returns true if the cell lies on the board.
    #[must_use]
    pub const fn in_bounds(self) -> bool {
        self.row < BOARD_ROWS && self.col < BOARD_COLS
    }

    /// Returns the cell as a position vector (`x` = column, `y` = row).
    #[must_use]
    pub fn as_ivec2(self) -> IVec2 {
        IVec2::new(i32::from(self.col), i32::from(self.row))
    }

    /// Converts a position vector back into a cell, if it is on the board.
    #[must_use]
    pub fn from_ivec2(pos: IVec2) -> Option<Self> {
        if !row_in_bounds(pos.y) || !col_in_bounds(pos.x) {
            return None;
        }
        // Both components were just range-checked against u8-sized bounds.
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        Some(Self::new(pos.y as u8, pos.x as u8))
    }

    /// Returns the neighbouring cell in `direction`, if it is on the board.
    #[must_use]
    pub fn step(self, direction: Direction) -> Option<Self> {
        Self::from_ivec2(self.as_ivec2() + direction.delta())
    }

    /// Iterates over every cell of the board in row-major order.
    pub fn all() -> impl Iterator<Item = Cell> {
        (0..BOARD_ROWS).flat_map(|row| (0..BOARD_COLS).map(move |col| Cell::new(row, col)))
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.row, self.col)
    }
}

/// Returns true if `row` is a valid board row.
#[must_use]
pub fn row_in_bounds(row: i32) -> bool {
    (0..i32::from(BOARD_ROWS)).contains(&row)
}

/// Returns true if `col` is a valid board column.
#[must_use]
pub fn col_in_bounds(col: i32) -> bool {
    (0..i32::from(BOARD_COLS)).contains(&col)
}

// =============================================================================
// Direction
// =============================================================================

/// One of the eight compass directions a beam can travel or a mirror can face.
///
/// Variants are declared clockwise from north so that [`Direction::index`]
/// doubles as an octant number; the reflection table relies on this order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Up.
    N,
    /// Up and right.
    NE,
    /// Right.
    E,
    /// Down and right.
    SE,
    /// Down.
    S,
    /// Down and left.
    SW,
    /// Left.
    W,
    /// Up and left.
    NW,
}

impl Direction {
    /// All eight directions in clockwise order starting at north.
    pub const ALL: [Direction; 8] = [
        Direction::N,
        Direction::NE,
        Direction::E,
        Direction::SE,
        Direction::S,
        Direction::SW,
        Direction::W,
        Direction::NW,
    ];

    /// The four directions a nexus may relocate along.
    pub const ORTHOGONAL: [Direction; 4] = [Direction::N, Direction::S, Direction::W, Direction::E];

    /// Returns the octant number, 0 for north increasing clockwise.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Returns the direction for an octant number (taken modulo 8).
    #[must_use]
    pub const fn from_index(index: usize) -> Self {
        Self::ALL[index % 8]
    }

    /// Returns the row component of the step (-1 is north).
    #[must_use]
    pub const fn row_step(self) -> i32 {
        match self {
            Self::N | Self::NE | Self::NW => -1,
            Self::E | Self::W => 0,
            Self::SE | Self::S | Self::SW => 1,
        }
    }

    /// Returns the column component of the step (-1 is west).
    #[must_use]
    pub const fn col_step(self) -> i32 {
        match self {
            Self::NW | Self::W | Self::SW => -1,
            Self::N | Self::S => 0,
            Self::NE | Self::E | Self::SE => 1,
        }
    }

    /// Returns the step as a vector (`x` = column, `y` = row).
    #[must_use]
    pub fn delta(self) -> IVec2 {
        IVec2::new(self.col_step(), self.row_step())
    }

    /// Looks up the direction whose step equals `delta`.
    #[must_use]
    pub fn from_delta(delta: IVec2) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.delta() == delta)
    }

    /// Returns the direction pointing the other way.
    #[must_use]
    pub const fn opposite(self) -> Self {
        Self::from_index(self.index() + 4)
    }

    /// Returns the direction with its row component negated.
    ///
    /// This is the bounce applied when a diagonal beam meets the top or
    /// bottom edge of the board. East and west are unchanged.
    #[must_use]
    pub const fn with_row_flipped(self) -> Self {
        match self {
            Self::N => Self::S,
            Self::NE => Self::SE,
            Self::SE => Self::NE,
            Self::S => Self::N,
            Self::SW => Self::NW,
            Self::NW => Self::SW,
            Self::E => Self::E,
            Self::W => Self::W,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::N => "N",
            Self::NE => "NE",
            Self::E => "E",
            Self::SE => "SE",
            Self::S => "S",
            Self::SW => "SW",
            Self::W => "W",
            Self::NW => "NW",
        };
        f.write_str(name)
    }
}

// =============================================================================
// Zones
// =============================================================================

/// The columns a seat may act within.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Zone {
    cols: Range<u8>,
}

impl Zone {
    /// Returns the home zone of `player` in a match with `player_count` seats.
    ///
    /// With a single seat the zone is the whole board.
    #[must_use]
    pub fn for_player(player: usize, player_count: usize) -> Self {
        let cols = if player_count <= 1 {
            0..BOARD_COLS
        } else if player == 0 {
            0..ZONE_SPLIT_COL
        } else {
            ZONE_SPLIT_COL..BOARD_COLS
        };
        Self { cols }
    }

    /// Returns true if `cell` is on the board and inside the zone.
    #[must_use]
    pub fn contains(&self, cell: Cell) -> bool {
        cell.row < BOARD_ROWS && self.cols.contains(&cell.col)
    }

    /// Returns the column range of the zone.
    #[must_use]
    pub fn columns(&self) -> Range<u8> {
        self.cols.clone()
    }

    /// Iterates over every cell of the zone in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        (0..BOARD_ROWS).flat_map(move |row| self.cols.clone().map(move |col| Cell::new(row, col)))
    }
}

/// Returns the seat that owns column `col`.
///
/// Sandbox matches attribute every column to seat 0.
#[must_use]
pub fn zone_owner(col: u8, player_count: usize) -> usize {
    if player_count <= 1 || col < ZONE_SPLIT_COL {
        0
    } else {
        1
    }
}

// =============================================================================
// Tests
// =============================================================================
