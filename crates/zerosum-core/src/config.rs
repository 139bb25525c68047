//! Match configuration accepted when a match is created.
//!
//! Every field has a default so hosts can deserialize partial settings:
//!
//! ```
//! use zerosum_core::config::{MatchConfig, MatchMode};
//!
//! let config = MatchConfig::default();
//! assert_eq!(config.max_energy, 10);
//! assert_eq!(config.nexus_hp, 3);
//! assert_eq!(config.mode, MatchMode::TwoPlayer);
//! assert!(config.validate(2).is_ok());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default size of the shared energy pool.
pub const DEFAULT_MAX_ENERGY: u32 = 10;

/// Default starting hit points of a nexus.
pub const DEFAULT_NEXUS_HP: u32 = 3;

/// Seat layout of a match.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MatchMode {
    /// Two opposing seats, each confined to its half of the board.
    #[default]
    TwoPlayer,
    /// A single seat with free building and the whole board as its zone.
    Sandbox,
}

impl MatchMode {
    /// Number of seats the mode requires.
    #[must_use]
    pub const fn seat_count(self) -> usize {
        match self {
            Self::TwoPlayer => 2,
            Self::Sandbox => 1,
        }
    }
}

/// Settings fixed at match creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Size of the shared energy pool once setup completes.
    pub max_energy: u32,
    /// Starting hit points of every nexus.
    pub nexus_hp: u32,
    /// Seat layout.
    pub mode: MatchMode,
    /// Cosmetic difficulty label shown in bot names. Not read by the policy.
    pub bot_difficulty: Option<String>,
    /// Reject `Fire` along the reverse of the shot that last struck the
    /// actor's nexus, instead of leaving that to the input layer.
    pub enforce_reciprocal_block: bool,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            max_energy: DEFAULT_MAX_ENERGY,
            nexus_hp: DEFAULT_NEXUS_HP,
            mode: MatchMode::TwoPlayer,
            bot_difficulty: None,
            enforce_reciprocal_block: false,
        }
    }
}

impl MatchConfig {
    /// Creates a sandbox configuration with default energy and hit points.
    #[must_use]
    pub fn sandbox() -> Self {
        Self {
            mode: MatchMode::Sandbox,
            ..Self::default()
        }
    }

    /// Checks the configuration against the number of seated participants.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the nexus would start dead or the seat count
    /// does not match the mode.
    pub fn validate(&self, seats: usize) -> Result<(), ConfigError> {
        if self.nexus_hp == 0 {
            return Err(ConfigError::ZeroNexusHp);
        }
        let expected = self.mode.seat_count();
        if seats != expected {
            return Err(ConfigError::SeatCount {
                mode: self.mode,
                expected,
                actual: seats,
            });
        }
        Ok(())
    }
}

/// A match configuration that cannot be played.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Nexus starting hit points must be positive.
    #[error("nexus starting hp must be at least 1")]
    ZeroNexusHp,
    /// Wrong number of participants for the mode.
    #[error("{mode:?} needs {expected} participant(s), got {actual}")]
    SeatCount {
        /// Requested mode.
        mode: MatchMode,
        /// Seats the mode needs.
        expected: usize,
        /// Participants supplied.
        actual: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_dead_nexus() {
        let config = MatchConfig {
            nexus_hp: 0,
            ..MatchConfig::default()
        };
        assert_eq!(config.validate(2), Err(ConfigError::ZeroNexusHp));
    }

    #[test]
    fn rejects_wrong_seat_count() {
        let err = MatchConfig::sandbox().validate(2).unwrap_err();
        assert!(matches!(err, ConfigError::SeatCount { expected: 1, actual: 2, .. }));
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: MatchConfig = serde_json::from_str(r#"{"max_energy": 6}"#).unwrap();
        assert_eq!(config.max_energy, 6);
        assert_eq!(config.nexus_hp, DEFAULT_NEXUS_HP);
        assert!(!config.enforce_reciprocal_block);
    }
}
