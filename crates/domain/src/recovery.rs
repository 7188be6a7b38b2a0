//! Night recovery planning: when to bring the house back to comfort.
//!
//! Recovery targets the earliest upcoming alarm before a morning cutoff and
//! starts early by a lead time that grows with the gap between the outside
//! temperature and the comfort setpoint.

use chrono::{Duration, NaiveTime};
use serde::Deserialize;

use crate::error::{ValidationError, ensure_finite, ensure_ordered};
use crate::time::{WallClock, deserialize_time_of_day, hour_minute};

/// Longest lead time a recovery may use: one day.
pub const MAX_LEAD_MINUTES: f64 = 24.0 * 60.0;

/// Tunables for recovery planning.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct RecoverySettings {
    /// Lead time with no temperature gap, and when the outside temperature is unknown.
    pub lead_base_minutes: f64,
    /// Extra lead minutes per degree between outside and target.
    pub lead_per_degree_minutes: f64,
    /// Lower clamp for the lead time.
    pub lead_min_minutes: f64,
    /// Upper clamp for the lead time.
    pub lead_max_minutes: f64,
    /// Alarms at or after this time tomorrow are ignored.
    #[serde(deserialize_with = "deserialize_time_of_day")]
    pub alarm_cutoff: NaiveTime,
    /// Wake time assumed when no alarm qualifies.
    #[serde(deserialize_with = "deserialize_time_of_day")]
    pub fallback_wake: NaiveTime,
}

impl Default for RecoverySettings {
    fn default() -> Self {
        Self {
            lead_base_minutes: 15.0,
            lead_per_degree_minutes: 1.5,
            lead_min_minutes: 15.0,
            lead_max_minutes: 90.0,
            alarm_cutoff: hour_minute(9, 0),
            fallback_wake: hour_minute(8, 0),
        }
    }
}

/// Where the recovery target came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakeSource {
    /// An occupant's next alarm.
    Alarm,
    /// No alarm qualified; the fixed fallback wake time was used.
    Fallback,
}

/// A computed recovery schedule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecoveryPlan {
    /// The wake-up instant recovery is aimed at.
    pub wake_at: WallClock,
    /// Where `wake_at` came from.
    pub source: WakeSource,
    /// Lead time in minutes.
    pub lead_minutes: f64,
    /// When recovery should begin.
    pub recover_at: WallClock,
}

impl RecoveryPlan {
    /// Whether recovery should happen immediately.
    #[must_use]
    pub fn is_due(&self, now: WallClock) -> bool {
        self.recover_at <= now
    }
}

impl RecoverySettings {
    /// Validate lead time bounds.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), ValidationError> {
        ensure_finite("lead_base_minutes", self.lead_base_minutes)?;
        ensure_finite("lead_per_degree_minutes", self.lead_per_degree_minutes)?;
        ensure_finite("lead_min_minutes", self.lead_min_minutes)?;
        ensure_finite("lead_max_minutes", self.lead_max_minutes)?;
        for (field, value) in [
            ("lead_base_minutes", self.lead_base_minutes),
            ("lead_per_degree_minutes", self.lead_per_degree_minutes),
            ("lead_min_minutes", self.lead_min_minutes),
        ] {
            if value < 0.0 {
                return Err(ValidationError::NotPositive { field });
            }
        }
        if self.lead_max_minutes > MAX_LEAD_MINUTES {
            return Err(ValidationError::TooLarge {
                field: "lead_max_minutes",
                max: MAX_LEAD_MINUTES,
            });
        }
        ensure_ordered(
            ("lead_min_minutes", self.lead_min_minutes),
            ("lead_max_minutes", self.lead_max_minutes),
        )
    }

    /// Lead time in minutes for reaching `target` given the outside temperature.
    #[must_use]
    pub fn lead_minutes(&self, outside: Option<f64>, target: f64) -> f64 {
        match outside {
            Some(outside) => {
                let delta = (outside - target).abs();
                (self.lead_base_minutes + self.lead_per_degree_minutes * delta)
                    .max(self.lead_min_minutes)
                    .min(self.lead_max_minutes)
            }
            None => self.lead_base_minutes,
        }
    }

    /// Pick the wake-up instant: the earliest alarm strictly between `now`
    /// and tomorrow's cutoff, else the fallback wake time (today if still
    /// ahead, otherwise tomorrow).
    #[must_use]
    pub fn wake_time(
        &self,
        now: WallClock,
        alarms: impl IntoIterator<Item = WallClock>,
    ) -> (WallClock, WakeSource) {
        let cutoff = (now.date() + Duration::days(1)).and_time(self.alarm_cutoff);
        let earliest = alarms
            .into_iter()
            .filter(|alarm| *alarm > now && *alarm < cutoff)
            .min();
        if let Some(alarm) = earliest {
            return (alarm, WakeSource::Alarm);
        }
        let mut fallback = now.date().and_time(self.fallback_wake);
        if fallback <= now {
            fallback += Duration::days(1);
        }
        (fallback, WakeSource::Fallback)
    }

    /// Build the full recovery plan.
    #[must_use]
    pub fn plan(
        &self,
        now: WallClock,
        alarms: impl IntoIterator<Item = WallClock>,
        outside: Option<f64>,
        target: f64,
    ) -> RecoveryPlan {
        let (wake_at, source) = self.wake_time(now, alarms);
        let lead_minutes = self.lead_minutes(outside, target);
        RecoveryPlan {
            wake_at,
            source,
            lead_minutes,
            recover_at: wake_at - minutes(lead_minutes),
        }
    }
}

/// Lead minutes as a duration, clamped to `0..=MAX_LEAD_MINUTES`.
#[allow(clippy::cast_possible_truncation)]
fn minutes(value: f64) -> Duration {
    let clamped = if value.is_finite() {
        value.clamp(0.0, MAX_LEAD_MINUTES)
    } else {
        0.0
    };
    Duration::try_seconds((clamped * 60.0).round() as i64).unwrap_or_else(Duration::zero)
}
