//! Controller tunables.
//!
//! Every struct deserialises with defaults for missing fields so a
//! configuration file only needs to name what it changes.

use chrono::{Duration, NaiveTime};
use serde::Deserialize;

use crate::error::{ValidationError, ensure_finite};
use crate::flag::Flag;
use crate::recovery::RecoverySettings;
use crate::setpoint::SetpointLimits;
use crate::time::{deserialize_time_of_day, hour_minute};

/// Away setback scaling.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct AwaySettings {
    /// Distance at which the setback reaches its extreme.
    pub max_distance_miles: f64,
}

impl Default for AwaySettings {
    fn default() -> Self {
        Self {
            max_distance_miles: 30.0,
        }
    }
}

/// Vacation setback and pre-arrival recovery.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct VacationSettings {
    /// Crossing below this distance restores comfort ahead of arrival.
    pub pre_arrival_miles: f64,
}

impl Default for VacationSettings {
    fn default() -> Self {
        Self {
            pre_arrival_miles: 75.0,
        }
    }
}

/// Nightly setback, recovery and fail-safe.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct NightSettings {
    /// When night mode is switched on.
    #[serde(deserialize_with = "deserialize_time_of_day")]
    pub activation_time: NaiveTime,
    /// When night mode and bedtime flags are forced off.
    #[serde(deserialize_with = "deserialize_time_of_day")]
    pub failsafe_time: NaiveTime,
    /// Next-alarm sensors, one per occupant.
    pub alarm_sensors: Vec<String>,
    /// Bedtime flags cleared by the fail-safe (entity names without domain).
    pub bedtime_flags: Vec<String>,
    /// Recovery planning.
    pub recovery: RecoverySettings,
}

impl Default for NightSettings {
    fn default() -> Self {
        Self {
            activation_time: NaiveTime::MIN,
            failsafe_time: hour_minute(10, 0),
            alarm_sensors: vec![
                "sensor.primary_next_alarm".to_string(),
                "sensor.secondary_next_alarm".to_string(),
            ],
            bedtime_flags: vec![
                "primary_bed".to_string(),
                "secondary_bed".to_string(),
                "basement_bed".to_string(),
            ],
            recovery: RecoverySettings::default(),
        }
    }
}

impl NightSettings {
    /// The bedtime flags as [`Flag`] values.
    #[must_use]
    pub fn bedtime(&self) -> Vec<Flag> {
        self.bedtime_flags
            .iter()
            .map(|name| Flag::Bedtime(name.clone()))
            .collect()
    }

    /// Whether `sensor` is one of the tracked alarm sensors.
    #[must_use]
    pub fn tracks_alarm(&self, sensor: &str) -> bool {
        self.alarm_sensors.iter().any(|tracked| tracked == sensor)
    }
}

/// Fan circulation duty cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CirculatorSettings {
    /// Minutes the fan runs per cycle.
    pub on_minutes: u32,
    /// Minutes the fan rests per cycle.
    pub auto_minutes: u32,
    /// Minutes to wait after heating/cooling stops before cycling again.
    pub quiet_minutes: u32,
}

impl Default for CirculatorSettings {
    fn default() -> Self {
        Self {
            on_minutes: 20,
            auto_minutes: 10,
            quiet_minutes: 10,
        }
    }
}

impl CirculatorSettings {
    /// Dwell with the fan forced on.
    #[must_use]
    pub fn on_dwell(&self) -> Duration {
        Duration::minutes(i64::from(self.on_minutes))
    }

    /// Dwell with the fan back on auto.
    #[must_use]
    pub fn auto_dwell(&self) -> Duration {
        Duration::minutes(i64::from(self.auto_minutes))
    }

    /// Wait after heating/cooling ends.
    #[must_use]
    pub fn quiet_period(&self) -> Duration {
        Duration::minutes(i64::from(self.quiet_minutes))
    }
}

/// All climate tunables together.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ClimateSettings {
    pub setpoints: SetpointLimits,
    pub away: AwaySettings,
    pub vacation: VacationSettings,
    pub night: NightSettings,
    pub circulator: CirculatorSettings,
}

impl ClimateSettings {
    /// Validate every section.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.setpoints.validate()?;
        ensure_finite("max_distance_miles", self.away.max_distance_miles)?;
        if self.away.max_distance_miles <= 0.0 {
            return Err(ValidationError::NotPositive {
                field: "max_distance_miles",
            });
        }
        ensure_finite("pre_arrival_miles", self.vacation.pre_arrival_miles)?;
        if self.vacation.pre_arrival_miles <= 0.0 {
            return Err(ValidationError::NotPositive {
                field: "pre_arrival_miles",
            });
        }
        self.night.recovery.validate()?;
        if self.night.alarm_sensors.is_empty() {
            return Err(ValidationError::Empty {
                field: "alarm_sensors",
            });
        }
        for (field, minutes) in [
            ("on_minutes", self.circulator.on_minutes),
            ("auto_minutes", self.circulator.auto_minutes),
        ] {
            if minutes == 0 {
                return Err(ValidationError::NotPositive { field });
            }
        }
        Ok(())
    }
}
