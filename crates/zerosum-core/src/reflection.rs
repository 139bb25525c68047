//! Mirror reflection table.
//!
//! A mirror faces one of the eight directions. A beam arriving *from* that
//! facing, or from either neighbouring octant, strikes the reflective face and
//! bounces specularly; a beam arriving from any of the other five octants hits
//! the back or sides and destroys the mirror.
//!
//! Directions in the table are travel directions. A beam travelling south
//! arrives from the north, so it strikes the face of a north-facing mirror and
//! is sent straight back:
//!
//! ```
//! use zerosum_core::board::Direction;
//! use zerosum_core::reflection::{reflect, Reflection};
//!
//! assert_eq!(reflect(Direction::N, Direction::S), Reflection::Redirect(Direction::N));
//! assert_eq!(reflect(Direction::N, Direction::NW), Reflection::Destroy);
//! ```

use serde::{Deserialize, Serialize};

use crate::board::Direction;

/// Outcome of a beam meeting a mirror.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Reflection {
    /// The beam leaves in this direction.
    Redirect(Direction),
    /// The mirror is struck and the beam stops.
    Destroy,
}

/// Every (orientation, travel direction) pair, indexed by octant.
///
/// Being a dense array, the table cannot have gaps.
pub static REFLECTION_TABLE: [[Reflection; 8]; 8] = build_table();

const fn build_table() -> [[Reflection; 8]; 8] {
    let mut table = [[Reflection::Destroy; 8]; 8];
    let mut orientation = 0;
    while orientation < 8 {
        let mut travel = 0;
        while travel < 8 {
            table[orientation][travel] = entry(orientation, travel);
            travel += 1;
        }
        orientation += 1;
    }
    table
}

/// Specular rule on octant numbers: with `from` the octant the beam arrives
/// from, a face at `orientation` sends it out at `2 * orientation - from`,
/// provided `from` is within one octant of the face.
const fn entry(orientation: usize, travel: usize) -> Reflection {
    let from = (travel + 4) % 8;
    let offset = (from + 8 - orientation) % 8;
    match offset {
        0 | 1 | 7 => Reflection::Redirect(Direction::from_index(2 * orientation + 8 - from)),
        _ => Reflection::Destroy,
    }
}

/// Looks up what a mirror facing `orientation` does to a beam travelling `travel`.
#[must_use]
pub fn reflect(orientation: Direction, travel: Direction) -> Reflection {
    REFLECTION_TABLE[orientation.index()][travel.index()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use Direction::{E, N, NE, NW, S, SE, SW, W};

    #[test]
    fn every_orientation_reflects_exactly_three_directions() {
        for orientation in Direction::ALL {
            let reflecting = Direction::ALL
                .into_iter()
                .filter(|&travel| reflect(orientation, travel) != Reflection::Destroy)
                .count();
            assert_eq!(reflecting, 3, "orientation {orientation}");
        }
    }

    #[test]
    fn north_mirror_retroreflects_southbound_beam() {
        // Mirror at (3,7) facing N, beam arriving with step (+1, 0).
        assert_eq!(reflect(N, S), Reflection::Redirect(N));
        assert_eq!(N.delta(), -S.delta());
    }

    #[test]
    fn north_mirror_flips_diagonals() {
        assert_eq!(reflect(N, SE), Reflection::Redirect(NE));
        assert_eq!(reflect(N, SW), Reflection::Redirect(NW));
        for travel in [N, NE, E, W, NW] {
            assert_eq!(reflect(N, travel), Reflection::Destroy);
        }
    }

    #[test]
    fn diagonal_mirror_turns_orthogonal_beams() {
        // North-east face: a southbound beam leaves east, a westbound beam leaves north.
        assert_eq!(reflect(NE, S), Reflection::Redirect(E));
        assert_eq!(reflect(NE, W), Reflection::Redirect(N));
        assert_eq!(reflect(NE, SW), Reflection::Redirect(NE));
        assert_eq!(reflect(NE, N), Reflection::Destroy);
    }

    #[test]
    fn matches_hand_written_rules_for_remaining_faces() {
        assert_eq!(reflect(E, SW), Reflection::Redirect(SE));
        assert_eq!(reflect(E, NW), Reflection::Redirect(NE));
        assert_eq!(reflect(SE, W), Reflection::Redirect(S));
        assert_eq!(reflect(SE, N), Reflection::Redirect(E));
        assert_eq!(reflect(S, NE), Reflection::Redirect(SE));
        assert_eq!(reflect(SW, N), Reflection::Redirect(W));
        assert_eq!(reflect(SW, E), Reflection::Redirect(S));
        assert_eq!(reflect(W, SE), Reflection::Redirect(SW));
        assert_eq!(reflect(NW, E), Reflection::Redirect(N));
        assert_eq!(reflect(NW, S), Reflection::Redirect(W));
    }

    #[test]
    fn reflections_are_reversible() {
        // Sending the outgoing beam back reproduces the reversed incoming beam.
        for orientation in Direction::ALL {
            for travel in Direction::ALL {
                if let Reflection::Redirect(out) = reflect(orientation, travel) {
                    assert_eq!(
                        reflect(orientation, out.opposite()),
                        Reflection::Redirect(travel.opposite())
                    );
                }
            }
        }
    }
}
