//! Setpoint maths: comfort defaults, setback extremes, distance scaling and
//! the per-controller idempotence gate.

use serde::Deserialize;

use crate::error::{ValidationError, ensure_finite, ensure_ordered};
use crate::hvac::HvacOperatingMode;

/// Temperature bounds (°F) shared by every controller.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct SetpointLimits {
    /// Comfort setpoint while heating.
    pub default_heat: f64,
    /// Comfort setpoint while cooling.
    pub default_cool: f64,
    /// Deepest heating setback (away floor, night setback).
    pub min_heat: f64,
    /// Highest cooling setback (away ceiling, night setback).
    pub max_cool: f64,
    /// Heating setpoint pinned during vacation.
    pub vacation_heat: f64,
    /// Cooling setpoint pinned during vacation.
    pub vacation_cool: f64,
}

impl Default for SetpointLimits {
    fn default() -> Self {
        Self {
            default_heat: 68.0,
            default_cool: 73.0,
            min_heat: 64.0,
            max_cool: 76.0,
            vacation_heat: 60.0,
            vacation_cool: 80.0,
        }
    }
}

impl SetpointLimits {
    /// Validate that every value is finite and the bounds nest properly:
    /// `vacation_heat <= min_heat <= default_heat` and
    /// `default_cool <= max_cool <= vacation_cool`.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), ValidationError> {
        ensure_finite("default_heat", self.default_heat)?;
        ensure_finite("default_cool", self.default_cool)?;
        ensure_finite("min_heat", self.min_heat)?;
        ensure_finite("max_cool", self.max_cool)?;
        ensure_finite("vacation_heat", self.vacation_heat)?;
        ensure_finite("vacation_cool", self.vacation_cool)?;
        ensure_ordered(("vacation_heat", self.vacation_heat), ("min_heat", self.min_heat))?;
        ensure_ordered(("min_heat", self.min_heat), ("default_heat", self.default_heat))?;
        ensure_ordered(("default_cool", self.default_cool), ("max_cool", self.max_cool))?;
        ensure_ordered(("max_cool", self.max_cool), ("vacation_cool", self.vacation_cool))?;
        Ok(())
    }

    /// Comfort setpoint for the operating mode.
    #[must_use]
    pub fn default_for(&self, mode: HvacOperatingMode) -> Option<f64> {
        match mode {
            HvacOperatingMode::Heat => Some(self.default_heat),
            HvacOperatingMode::Cool => Some(self.default_cool),
            HvacOperatingMode::Other => None,
        }
    }

    /// Overnight setback for the operating mode.
    #[must_use]
    pub fn night_setback_for(&self, mode: HvacOperatingMode) -> Option<f64> {
        match mode {
            HvacOperatingMode::Heat => Some(self.min_heat),
            HvacOperatingMode::Cool => Some(self.max_cool),
            HvacOperatingMode::Other => None,
        }
    }

    /// Vacation setpoint for the operating mode.
    #[must_use]
    pub fn vacation_for(&self, mode: HvacOperatingMode) -> Option<f64> {
        match mode {
            HvacOperatingMode::Heat => Some(self.vacation_heat),
            HvacOperatingMode::Cool => Some(self.vacation_cool),
            HvacOperatingMode::Other => None,
        }
    }

    /// Setback scaled linearly with distance from home, rounded to a whole
    /// degree and clamped between the comfort default and the setback extreme.
    ///
    /// At `distance_miles = 0` this is the comfort default; at
    /// `max_distance_miles` and beyond it is `min_heat` / `max_cool`.
    #[must_use]
    pub fn scaled_for_distance(
        &self,
        mode: HvacOperatingMode,
        distance_miles: f64,
        max_distance_miles: f64,
    ) -> Option<f64> {
        let ratio = distance_miles / max_distance_miles;
        match mode {
            HvacOperatingMode::Heat => {
                let raw = self.default_heat - ratio * (self.default_heat - self.min_heat);
                Some(raw.clamp(self.min_heat, self.default_heat).round())
            }
            HvacOperatingMode::Cool => {
                let raw = self.default_cool + ratio * (self.max_cool - self.default_cool);
                Some(raw.clamp(self.default_cool, self.max_cool).round())
            }
            HvacOperatingMode::Other => None,
        }
    }
}

/// Remembers the last setpoint a controller wrote so identical writes are
/// skipped, and so the controller knows whether a restore is owed.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SetpointGate {
    last_applied: Option<f64>,
}

impl SetpointGate {
    /// An empty gate.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Last setpoint this controller wrote, if any.
    #[must_use]
    pub fn last_applied(&self) -> Option<f64> {
        self.last_applied
    }

    /// Whether this controller currently holds a setpoint.
    #[must_use]
    pub fn is_engaged(&self) -> bool {
        self.last_applied.is_some()
    }

    /// Record `target` and return `true` if it must be written, or `false`
    /// when it equals the last applied value.
    #[allow(clippy::float_cmp)]
    pub fn admit(&mut self, target: f64) -> bool {
        if self.last_applied == Some(target) {
            return false;
        }
        self.last_applied = Some(target);
        true
    }

    /// Forget the last applied value, returning it.
    pub fn clear(&mut self) -> Option<f64> {
        self.last_applied.take()
    }
}
