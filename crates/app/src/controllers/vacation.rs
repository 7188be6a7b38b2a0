//! Vacation setback with a one-shot pre-arrival recovery.

use climatehub_domain::mode::{ModeTransition, OccupancyMode};
use climatehub_domain::setpoint::{SetpointGate, SetpointLimits};
use climatehub_domain::settings::VacationSettings;

use super::write_setpoint;
use crate::ports::Home;

const NAME: &str = "vacation";

/// Pins the vacation setpoint while the mode is `Vacation`.
///
/// Comfort is restored once per vacation: either when the nearest occupant
/// crosses inside the pre-arrival radius, or when the mode drops to `Home`
/// or `Guest`. Dropping to `Away` hands the thermostat to the away
/// controller without restoring.
#[derive(Debug, Clone)]
pub struct VacationSetbackController {
    limits: SetpointLimits,
    settings: VacationSettings,
    gate: SetpointGate,
    pre_arrival_done: bool,
}

impl VacationSetbackController {
    #[must_use]
    pub fn new(limits: SetpointLimits, settings: VacationSettings) -> Self {
        Self {
            limits,
            settings,
            gate: SetpointGate::new(),
            pre_arrival_done: false,
        }
    }

    /// Catch up with a mode already in effect at startup.
    pub fn start(&mut self, home: &impl Home, mode: OccupancyMode) {
        if mode == OccupancyMode::Vacation {
            self.enter(home);
        }
    }

    pub fn on_mode_changed(&mut self, home: &impl Home, transition: ModeTransition) {
        if transition.enters(OccupancyMode::Vacation) {
            self.enter(home);
            return;
        }
        if !transition.leaves(OccupancyMode::Vacation) {
            return;
        }
        match transition.to {
            OccupancyMode::Home | OccupancyMode::Guest => {
                if self.pre_arrival_done {
                    tracing::debug!(to = %transition.to, "comfort already restored by pre-arrival");
                } else {
                    self.restore(home);
                }
            }
            OccupancyMode::Away | OccupancyMode::Vacation => {
                tracing::debug!("leaving vacation for away, handing over without restore");
            }
        }
        self.gate.clear();
    }

    /// Watch for the downward crossing of the pre-arrival radius.
    ///
    /// Both readings must be present: a first reading inside the radius
    /// with nothing known before it never counts as an arrival.
    pub fn on_distance_changed(
        &mut self,
        home: &impl Home,
        mode: OccupancyMode,
        old: Option<f64>,
        new: Option<f64>,
    ) {
        if mode != OccupancyMode::Vacation || self.pre_arrival_done {
            return;
        }
        let (Some(old), Some(new)) = (old, new) else {
            return;
        };
        let threshold = self.settings.pre_arrival_miles;
        if old >= threshold && new < threshold {
            tracing::info!(old, new, threshold, "occupant approaching, restoring comfort");
            self.pre_arrival_done = true;
            self.restore(home);
        }
    }

    /// Whether this vacation's pre-arrival recovery has already run.
    #[must_use]
    pub fn pre_arrival_done(&self) -> bool {
        self.pre_arrival_done
    }

    /// Last setpoint this controller wrote during the current vacation.
    #[must_use]
    pub fn last_applied(&self) -> Option<f64> {
        self.gate.last_applied()
    }

    fn enter(&mut self, home: &impl Home) {
        self.pre_arrival_done = false;
        self.gate.clear();
        let mode = home.state().operating_mode();
        match self.limits.vacation_for(mode) {
            Some(target) => {
                write_setpoint(home, &mut self.gate, target, NAME);
            }
            None => tracing::debug!(?mode, "unsupported hvac mode, skipping vacation setback"),
        }
    }

    fn restore(&mut self, home: &impl Home) {
        let mode = home.state().operating_mode();
        match self.limits.default_for(mode) {
            Some(target) => {
                write_setpoint(home, &mut self.gate, target, NAME);
            }
            None => tracing::debug!(?mode, "unsupported hvac mode, skipping vacation restore"),
        }
    }
}
