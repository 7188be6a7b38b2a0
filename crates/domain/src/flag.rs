//! Boolean helper entities the engine reads and commands.

use std::fmt;

/// A named on/off flag owned by the platform.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Flag {
    /// Someone is on vacation; the house may be empty for days.
    Vacation,
    /// Guests are staying while the occupants are out.
    Guest,
    /// Overnight setback is in effect.
    NightMode,
    /// The fan circulation duty cycle is enabled.
    Circulator,
    /// An occupant's "in bed" flag, by entity name.
    Bedtime(String),
}

impl Flag {
    /// Platform entity id for this flag.
    #[must_use]
    pub fn entity_id(&self) -> String {
        match self {
            Self::Vacation => "input_boolean.vacation_mode".to_string(),
            Self::Guest => "input_boolean.guest_mode".to_string(),
            Self::NightMode => "input_boolean.night_mode".to_string(),
            Self::Circulator => "input_boolean.circulator".to_string(),
            Self::Bedtime(name) => format!("input_boolean.{name}"),
        }
    }

    /// Whether a change to this flag can change the occupancy mode.
    #[must_use]
    pub fn affects_occupancy(&self) -> bool {
        matches!(self, Self::Vacation | Self::Guest)
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.entity_id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_render_entity_ids() {
        assert_eq!(Flag::NightMode.to_string(), "input_boolean.night_mode");
        assert_eq!(
            Flag::Bedtime("primary_bed".to_string()).to_string(),
            "input_boolean.primary_bed"
        );
    }

    #[test]
    fn should_only_let_vacation_and_guest_affect_occupancy() {
        assert!(Flag::Vacation.affects_occupancy());
        assert!(Flag::Guest.affects_occupancy());
        assert!(!Flag::NightMode.affects_occupancy());
        assert!(!Flag::Circulator.affects_occupancy());
    }
}
