//! Range-bounded nexus relocation.
//!
//! A nexus moves orthogonally, at most [`NEXUS_RANGE`] steps from where it
//! stood when its owner's turn began, and may not pass through any unit other
//! than the mover's own nexus.

use std::collections::{HashSet, VecDeque};

use crate::board::{Cell, Direction};
use crate::state::GameState;

/// Maximum relocation distance per turn, in orthogonal steps.
pub const NEXUS_RANGE: u32 = 3;

/// Breadth-first distance from `start` to `target` for `player`'s nexus.
///
/// Only orthogonal steps are taken and the search stops expanding at
/// [`NEXUS_RANGE`]. A cell is enterable when it is empty, is the target, or
/// holds the mover's own nexus. Returns `None` if the target cannot be reached
/// within range.
#[must_use]
pub fn find_shortest_path(start: Cell, target: Cell, state: &GameState, player: usize) -> Option<u32> {
    let mut queue = VecDeque::from([(start, 0u32)]);
    let mut visited = HashSet::from([start]);

    while let Some((cell, dist)) = queue.pop_front() {
        if cell == target {
            return Some(dist);
        }
        if dist >= NEXUS_RANGE {
            continue;
        }
        for direction in Direction::ORTHOGONAL {
            let Some(next) = cell.step(direction) else {
                continue;
            };
            if !visited.insert(next) {
                continue;
            }
            let passable = match state.unit_at(next) {
                None => true,
                Some(unit) => next == target || unit.is_nexus_of(player),
            };
            if passable {
                queue.push_back((next, dist + 1));
            }
        }
    }
    None
}

/// Whether `player` may relocate their nexus to `target` this turn.
///
/// `turn_start` is where the nexus stood when the turn began; range is
/// measured from there regardless of any earlier move this turn.
#[must_use]
pub fn is_valid_nexus_move(turn_start: Cell, target: Cell, player: usize, state: &GameState) -> bool {
    if !target.in_bounds() {
        return false;
    }
    if !state.is_sandbox() && !state.zone(player).contains(target) {
        return false;
    }
    match find_shortest_path(turn_start, target, state, player) {
        Some(dist) if dist <= NEXUS_RANGE => {}
        _ => return false,
    }
    match state.unit_at(target) {
        None => true,
        Some(unit) => unit.is_nexus_of(player),
    }
}
