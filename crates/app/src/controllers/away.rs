//! Away setback: scale the setpoint with distance while nobody is home.

use climatehub_domain::mode::{ModeTransition, OccupancyMode};
use climatehub_domain::setpoint::{SetpointGate, SetpointLimits};
use climatehub_domain::settings::AwaySettings;

use super::write_setpoint;
use crate::ports::Home;

const NAME: &str = "away";

/// Scales the setpoint with the nearest occupant's distance while the mode
/// is `Away`, and restores the comfort default when the mode is left.
#[derive(Debug, Clone)]
pub struct AwaySetbackController {
    limits: SetpointLimits,
    settings: AwaySettings,
    gate: SetpointGate,
}

impl AwaySetbackController {
    #[must_use]
    pub fn new(limits: SetpointLimits, settings: AwaySettings) -> Self {
        Self {
            limits,
            settings,
            gate: SetpointGate::new(),
        }
    }

    /// Catch up with a mode already in effect at startup.
    pub fn start(&mut self, home: &impl Home, mode: OccupancyMode) {
        if mode == OccupancyMode::Away {
            self.enter(home);
        }
    }

    pub fn on_mode_changed(&mut self, home: &impl Home, transition: ModeTransition) {
        if transition.enters(OccupancyMode::Away) {
            self.enter(home);
        } else if transition.leaves(OccupancyMode::Away) {
            self.restore(home);
        }
    }

    /// Reapply for a new distance reading. Readings outside `Away` and
    /// missing readings are ignored.
    pub fn on_distance_changed(
        &mut self,
        home: &impl Home,
        mode: OccupancyMode,
        distance: Option<f64>,
    ) {
        if mode != OccupancyMode::Away {
            return;
        }
        match distance.filter(|d| d.is_finite()) {
            Some(distance) => self.apply(home, distance),
            None => tracing::debug!("distance unavailable, keeping away setpoint"),
        }
    }

    /// Last setpoint this controller wrote, while a setback is outstanding.
    #[must_use]
    pub fn last_applied(&self) -> Option<f64> {
        self.gate.last_applied()
    }

    fn enter(&mut self, home: &impl Home) {
        let distance = home
            .nearest_distance()
            .filter(|d| d.is_finite())
            .unwrap_or(0.0);
        self.apply(home, distance);
    }

    fn apply(&mut self, home: &impl Home, distance: f64) {
        let mode = home.state().operating_mode();
        let Some(target) =
            self.limits
                .scaled_for_distance(mode, distance, self.settings.max_distance_miles)
        else {
            tracing::debug!(?mode, "unsupported hvac mode, skipping away setback");
            return;
        };
        tracing::debug!(distance, target, "away setback computed");
        write_setpoint(home, &mut self.gate, target, NAME);
    }

    fn restore(&mut self, home: &impl Home) {
        if !self.gate.is_engaged() {
            return;
        }
        let mode = home.state().operating_mode();
        match self.limits.default_for(mode) {
            Some(target) => {
                write_setpoint(home, &mut self.gate, target, NAME);
            }
            None => tracing::debug!(?mode, "unsupported hvac mode, dropping away setback"),
        }
        self.gate.clear();
    }
}
