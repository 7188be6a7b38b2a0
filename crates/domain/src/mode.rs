//! Occupancy mode: the single derived "who is home" state every climate
//! controller keys off.

use serde::{Deserialize, Serialize};

/// Derived occupancy of the house. Exactly one value is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OccupancyMode {
    Home,
    Vacation,
    Guest,
    Away,
}

impl std::fmt::Display for OccupancyMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Home => f.write_str("home"),
            Self::Vacation => f.write_str("vacation"),
            Self::Guest => f.write_str("guest"),
            Self::Away => f.write_str("away"),
        }
    }
}

/// Raw observations the mode is derived from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModeInputs {
    /// Occupant count as reported by the home zone. Kept raw because the
    /// platform may report `unknown` or `unavailable`.
    pub zone_occupants: Option<String>,
    /// Vacation flag.
    pub vacation: bool,
    /// Guest flag.
    pub guest: bool,
}

impl ModeInputs {
    /// Occupant count if the zone state parses as an integer.
    #[must_use]
    pub fn occupant_count(&self) -> Option<i64> {
        self.zone_occupants
            .as_deref()
            .and_then(|raw| raw.trim().parse().ok())
    }

    /// Derive the occupancy mode.
    ///
    /// Precedence: occupants present → `Home`, then vacation, then guest,
    /// otherwise `Away`. An unparsable count counts as nobody home.
    #[must_use]
    pub fn evaluate(&self) -> OccupancyMode {
        if self.occupant_count().is_some_and(|count| count > 0) {
            OccupancyMode::Home
        } else if self.vacation {
            OccupancyMode::Vacation
        } else if self.guest {
            OccupancyMode::Guest
        } else {
            OccupancyMode::Away
        }
    }
}

/// A genuine change of occupancy mode (`from != to`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeTransition {
    pub from: OccupancyMode,
    pub to: OccupancyMode,
}

impl ModeTransition {
    /// Whether this transition leaves `mode`.
    #[must_use]
    pub fn leaves(&self, mode: OccupancyMode) -> bool {
        self.from == mode && self.to != mode
    }

    /// Whether this transition enters `mode`.
    #[must_use]
    pub fn enters(&self, mode: OccupancyMode) -> bool {
        self.to == mode && self.from != mode
    }
}
