//! Event: a notification delivered to the climate runtime.
//!
//! State changes carry both the previous and the new value, like the
//! platform's state-changed bus. Scheduled work comes back as
//! [`ClimateEvent::Daily`] and [`ClimateEvent::TimerFired`].

use std::fmt;

use crate::flag::Flag;
use crate::hvac::ThermostatState;

/// Identifies one scheduled timer instance.
///
/// A controller only acts on a fired timer whose token matches the one it
/// is holding, so late expirations of disposed timers are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerToken(u64);

impl TimerToken {
    /// Wrap a raw token value.
    #[must_use]
    pub fn new(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for TimerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer#{}", self.0)
    }
}

/// Which controller a one-shot timer belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Night setback recovery.
    NightRecovery,
    /// Circulator dwell or quiet period.
    Circulator,
}

/// Fixed time-of-day triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DailyTrigger {
    /// Turn night mode on (midnight by default).
    NightActivation,
    /// Force night mode and bedtime flags off (10:00 by default).
    NightFailsafe,
}

/// Everything the climate runtime reacts to.
#[derive(Debug, Clone, PartialEq)]
pub enum ClimateEvent {
    /// Home zone occupant count changed.
    ZoneOccupantsChanged {
        old: Option<String>,
        new: Option<String>,
    },
    /// A boolean flag changed.
    FlagChanged { flag: Flag, old: bool, new: bool },
    /// Nearest occupant distance from home (miles) changed.
    DistanceChanged { old: Option<f64>, new: Option<f64> },
    /// Outside temperature changed.
    OutsideTemperatureChanged { old: Option<f64>, new: Option<f64> },
    /// A next-alarm sensor changed.
    AlarmChanged {
        sensor: String,
        old: Option<String>,
        new: Option<String>,
    },
    /// Any thermostat state or attribute changed.
    ThermostatChanged {
        old: ThermostatState,
        new: ThermostatState,
    },
    /// A fixed time-of-day trigger fired.
    Daily(DailyTrigger),
    /// A one-shot timer expired.
    TimerFired { kind: TimerKind, token: TimerToken },
}
