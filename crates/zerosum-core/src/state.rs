//! Match state: players, phases, the shared economy, and the audience-tagged log.
//!
//! [`GameState`] is a plain value. The turn engine owns the authoritative
//! copy; everything else (tracer, pathfinder, bot, hosts) works on clones or
//! shared references to it. Serializing it yields the full snapshot a host
//! persists and broadcasts.
//!
//! # Economy
//!
//! Energy is zero-sum. Buildings are paid from the shared `energy_pool`;
//! destroyed buildings credit the attacker's `escrow`, which flows back into
//! the pool when that attacker's next turn begins. In two-player matches
//! `energy_pool + Σ escrow + Σ buildings` therefore always equals
//! `max_energy` once setup is complete (see [`GameState::energy_in_play`]).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::board::{Cell, Direction, Zone};
use crate::unit::{unit_at, Building, BuildingKind, Unit};

/// Turn budget granted in sandbox matches, where building is free.
pub const SANDBOX_TURN_BUDGET: u32 = 99;

// =============================================================================
// Players
// =============================================================================

/// Identity data supplied by the host for one seat.
///
/// The core never interprets these fields beyond copying them into the
/// [`Player`] record and naming players in log lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// Opaque account identifier.
    pub id: String,
    /// Name shown to other players.
    pub display_name: String,
    /// Preferred colour label.
    pub color: String,
    /// Whether the host drives this seat with the bot policy.
    pub is_bot: bool,
}

impl Participant {
    /// A human participant whose id doubles as display name.
    #[must_use]
    pub fn human(name: &str, color: &str) -> Self {
        Self {
            id: name.to_owned(),
            display_name: name.to_owned(),
            color: color.to_owned(),
            is_bot: false,
        }
    }

    /// A bot participant.
    #[must_use]
    pub fn bot(name: &str, color: &str) -> Self {
        Self {
            is_bot: true,
            ..Self::human(name, color)
        }
    }
}

/// One seat of a match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Opaque account identifier.
    pub id: String,
    /// Name used in log lines.
    pub display_name: String,
    /// Colour label.
    pub color: String,
    /// Current nexus position; `None` until placed during setup.
    pub nexus: Option<Cell>,
    /// Nexus position when this player's current (or most recent) turn began.
    /// Relocation range is measured from here.
    pub nexus_start: Option<Cell>,
    /// Remaining nexus hit points.
    pub nexus_hp: u32,
    /// Structures owned by this player.
    pub buildings: Vec<Building>,
    /// Energy earned by destroying buildings, released at this player's next turn.
    pub escrow: u32,
    /// Whether the host drives this seat with the bot policy.
    pub is_bot: bool,
    /// Lobby readiness flag, carried for the host.
    pub is_ready: bool,
}

impl Player {
    /// Creates a seat with no nexus placed yet.
    #[must_use]
    pub fn new(participant: Participant, nexus_hp: u32) -> Self {
        Self {
            id: participant.id,
            display_name: participant.display_name,
            color: participant.color,
            nexus: None,
            nexus_start: None,
            nexus_hp,
            buildings: Vec::new(),
            escrow: 0,
            is_bot: participant.is_bot,
            is_ready: false,
        }
    }

    /// Number of pylons this player owns.
    #[must_use]
    pub fn pylon_count(&self) -> usize {
        self.buildings.iter().filter(|b| b.kind.is_pylon()).count()
    }

    /// Removes the building at `cell`, returning it.
    pub fn remove_building_at(&mut self, cell: Cell) -> Option<Building> {
        let index = self.buildings.iter().position(|b| b.location == cell)?;
        Some(self.buildings.remove(index))
    }
}

// =============================================================================
// Phases and status
// =============================================================================

/// Where the match is in its turn cycle.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Every seat places its nexus.
    Setup,
    /// The actor builds and may relocate its nexus.
    BuyMove,
    /// The actor fires or skips.
    Attack,
    /// Terminal.
    GameOver,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Setup => "setup",
            Self::BuyMove => "buy/move",
            Self::Attack => "attack",
            Self::GameOver => "game over",
        };
        f.write_str(name)
    }
}

/// Whether the match can continue.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchStatus {
    /// Being played.
    InProgress,
    /// A nexus was destroyed; `winner` is set.
    GameOver,
    /// A participant left; no winner.
    Abandoned,
}

// =============================================================================
// Log
// =============================================================================

/// Who may see a log line.
///
/// Serialized as `"public"` or `"p<seat>"`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Audience {
    /// Everyone.
    Public,
    /// Only the given seat.
    Player(usize),
}

impl fmt::Display for Audience {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Public => f.write_str("public"),
            Self::Player(seat) => write!(f, "p{seat}"),
        }
    }
}

impl From<Audience> for String {
    fn from(audience: Audience) -> Self {
        audience.to_string()
    }
}

impl TryFrom<String> for Audience {
    type Error = String;

    fn try_from(tag: String) -> Result<Self, Self::Error> {
        if tag == "public" {
            return Ok(Self::Public);
        }
        tag.strip_prefix('p')
            .and_then(|seat| seat.parse().ok())
            .map(Self::Player)
            .ok_or_else(|| format!("unknown audience tag {tag:?}"))
    }
}

/// One line of end-user text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// The text.
    pub msg: String,
    /// Who may see it.
    pub audience: Audience,
}

impl LogEntry {
    /// A line everyone sees.
    pub fn public(msg: impl Into<String>) -> Self {
        Self {
            msg: msg.into(),
            audience: Audience::Public,
        }
    }

    /// A line only `seat` sees.
    pub fn private(seat: usize, msg: impl Into<String>) -> Self {
        Self {
            msg: msg.into(),
            audience: Audience::Player(seat),
        }
    }

    /// Returns true if `viewer` may see this line.
    #[must_use]
    pub fn is_visible_to(&self, viewer: usize) -> bool {
        match self.audience {
            Audience::Public => true,
            Audience::Player(seat) => seat == viewer,
        }
    }
}

// =============================================================================
// Staged actions
// =============================================================================

/// A BuyMove action staged during the current turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnAction {
    /// A structure was placed.
    Build {
        /// What was built.
        kind: BuildingKind,
        /// Where.
        location: Cell,
        /// Energy charged (0 in sandbox).
        cost: u32,
    },
    /// The nexus was relocated.
    MoveNexus {
        /// Position before the move.
        from: Cell,
        /// Position after the move.
        to: Cell,
    },
}

// =============================================================================
// Game state
// =============================================================================

/// The complete, serializable state of one match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    /// Seats in turn order (one in sandbox, two otherwise).
    pub players: Vec<Player>,
    /// Index of the acting seat.
    pub turn: usize,
    /// Current phase.
    pub phase: Phase,
    /// Whether the match continues.
    pub status: MatchStatus,
    /// Winning seat once a nexus falls.
    pub winner: Option<usize>,
    /// Pool size restored at the end of setup.
    pub max_energy: u32,
    /// Starting nexus hit points.
    pub max_nexus_hp: u32,
    /// Shared energy available for building.
    pub energy_pool: u32,
    /// Builds the actor may still make this turn.
    pub turn_budget: u32,
    /// Actions staged by the actor this turn.
    pub turn_actions: Vec<TurnAction>,
    /// End-user text, oldest first.
    pub log: Vec<LogEntry>,
    /// Direction of the most recent shot, cleared when a turn passes without one.
    pub last_shot_vector: Option<Direction>,
    /// Cells visited by the most recent shot, for animation.
    pub last_laser_path: Option<Vec<Cell>>,
    /// Seat whose nexus the most recent attack struck.
    pub last_nexus_hit: Option<usize>,
    /// Bumped on every accepted transition; orders snapshots.
    pub revision: u64,
}

impl GameState {
    /// Creates a match in the setup phase.
    #[must_use]
    pub fn new(players: Vec<Player>, max_energy: u32, max_nexus_hp: u32) -> Self {
        Self {
            players,
            turn: 0,
            phase: Phase::Setup,
            status: MatchStatus::InProgress,
            winner: None,
            max_energy,
            max_nexus_hp,
            energy_pool: max_energy,
            turn_budget: 0,
            turn_actions: Vec::new(),
            log: vec![LogEntry::public("Game started.")],
            last_shot_vector: None,
            last_laser_path: None,
            last_nexus_hit: None,
            revision: 0,
        }
    }

    /// Returns true for single-seat matches.
    #[must_use]
    pub fn is_sandbox(&self) -> bool {
        self.players.len() <= 1
    }

    /// Returns true once the match can no longer continue.
    #[must_use]
    pub fn is_over(&self) -> bool {
        self.phase == Phase::GameOver || self.status != MatchStatus::InProgress
    }

    /// The seat whose turn it is.
    #[must_use]
    pub fn actor(&self) -> Option<&Player> {
        self.players.get(self.turn)
    }

    /// Index of the seat that acts after the current one.
    #[must_use]
    pub fn next_turn(&self) -> usize {
        (self.turn + 1) % self.players.len().max(1)
    }

    /// Seat that wins if `loser`'s nexus falls.
    #[must_use]
    pub fn opponent_of(&self, loser: usize) -> usize {
        (loser + 1) % self.players.len().max(1)
    }

    /// Home zone of `player`.
    #[must_use]
    pub fn zone(&self, player: usize) -> Zone {
        Zone::for_player(player, self.players.len())
    }

    /// The unit standing on `cell`, if any.
    #[must_use]
    pub fn unit_at(&self, cell: Cell) -> Option<Unit> {
        unit_at(&self.players, cell)
    }

    /// Appends a log line.
    pub fn push_log(&mut self, entry: LogEntry) {
        self.log.push(entry);
    }

    /// Log lines visible to `viewer`, oldest first.
    pub fn log_for(&self, viewer: usize) -> impl Iterator<Item = &LogEntry> + '_ {
        self.log.iter().filter(move |entry| entry.is_visible_to(viewer))
    }

    /// Energy accounted for anywhere in the match: pool, escrow and standing
    /// buildings. Equals `max_energy` in two-player matches after setup.
    #[must_use]
    pub fn energy_in_play(&self) -> u64 {
        let escrow: u64 = self.players.iter().map(|p| u64::from(p.escrow)).sum();
        let buildings: u64 = self.players.iter().map(|p| p.buildings.len() as u64).sum();
        u64::from(self.energy_pool) + escrow + buildings
    }

    /// Direction `player` is conventionally barred from firing: straight back
    /// along the shot that last struck their nexus.
    ///
    /// Only meaningful in two-player matches. The input layer uses this to
    /// grey out a button; the engine enforces it only when configured to.
    #[must_use]
    pub fn blocked_fire_direction(&self, player: usize) -> Option<Direction> {
        if self.is_sandbox() {
            return None;
        }
        let nexus = self.players.get(player)?.nexus?;
        let path = self.last_laser_path.as_ref()?;
        let hit_index = path.iter().position(|&cell| cell == nexus)?;
        if hit_index == 0 {
            return None;
        }
        let incoming = nexus.as_ivec2() - path[hit_index - 1].as_ivec2();
        Direction::from_delta(-incoming)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_player_state() -> GameState {
        let players = vec![
            Player::new(Participant::human("alice", "Red"), 3),
            Player::new(Participant::bot("bot", "Blue"), 3),
        ];
        GameState::new(players, 10, 3)
    }

    #[test]
    fn new_state_is_in_setup() {
        let state = two_player_state();
        assert_eq!(state.phase, Phase::Setup);
        assert_eq!(state.status, MatchStatus::InProgress);
        assert!(!state.is_sandbox());
        assert_eq!(state.next_turn(), 1);
        assert_eq!(state.opponent_of(1), 0);
    }

    #[test]
    fn audience_serializes_as_tag() {
        let entry = LogEntry::private(1, "secret");
        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains(r#""audience":"p1""#));
        let back: LogEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, entry);

        let public: LogEntry = serde_json::from_str(r#"{"msg":"hi","audience":"public"}"#).unwrap();
        assert_eq!(public.audience, Audience::Public);
        assert!(serde_json::from_str::<LogEntry>(r#"{"msg":"x","audience":"team"}"#).is_err());
    }

    #[test]
    fn log_filtering_respects_audience() {
        let mut state = two_player_state();
        state.push_log(LogEntry::private(0, "for alice"));
        state.push_log(LogEntry::private(1, "for bot"));
        let seen: Vec<_> = state.log_for(0).map(|e| e.msg.as_str()).collect();
        assert_eq!(seen, vec!["Game started.", "for alice"]);
    }

    #[test]
    fn blocked_direction_reverses_incoming_shot() {
        let mut state = two_player_state();
        state.players[0].nexus = Some(Cell::new(3, 2));
        // Shot travelled west along row 3 into the nexus.
        state.last_laser_path = Some(vec![Cell::new(3, 5), Cell::new(3, 4), Cell::new(3, 3), Cell::new(3, 2)]);
        assert_eq!(state.blocked_fire_direction(0), Some(Direction::E));
        assert_eq!(state.blocked_fire_direction(1), None);
    }

    #[test]
    fn snapshot_round_trips_through_json() {
        let mut state = two_player_state();
        state.players[1].buildings.push(Building::new(BuildingKind::Mirror(Direction::NW), Cell::new(2, 7)));
        state.turn_actions.push(TurnAction::MoveNexus {
            from: Cell::new(1, 1),
            to: Cell::new(1, 2),
        });
        let json = serde_json::to_string(&state).unwrap();
        let back: GameState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }
}
