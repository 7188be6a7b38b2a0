//! Virtual thermostat: holds HVAC state and logs every command it accepts.

use std::sync::{Mutex, MutexGuard, PoisonError};

use climatehub_domain::hvac::{FanMode, ThermostatState};

#[derive(Debug, Default)]
struct Inner {
    state: ThermostatState,
    temperature_log: Vec<f64>,
    fan_log: Vec<FanMode>,
}

/// A simulated single-zone thermostat.
#[derive(Debug, Default)]
pub struct VirtualThermostat {
    inner: Mutex<Inner>,
}

impl VirtualThermostat {
    #[must_use]
    pub fn new(state: ThermostatState) -> Self {
        Self {
            inner: Mutex::new(Inner {
                state,
                ..Inner::default()
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn snapshot(&self) -> ThermostatState {
        self.lock().state.clone()
    }

    /// Mutate the state, returning `(old, new)` if anything changed.
    pub fn update(
        &self,
        mutate: impl FnOnce(&mut ThermostatState),
    ) -> Option<(ThermostatState, ThermostatState)> {
        let mut inner = self.lock();
        let old = inner.state.clone();
        mutate(&mut inner.state);
        (inner.state != old).then(|| (old, inner.state.clone()))
    }

    /// Accept a setpoint command.
    pub fn command_temperature(&self, target: f64) -> Option<(ThermostatState, ThermostatState)> {
        self.lock().temperature_log.push(target);
        self.update(|state| state.setpoint = Some(target))
    }

    /// Accept a fan mode command.
    pub fn command_fan(&self, fan_mode: FanMode) -> Option<(ThermostatState, ThermostatState)> {
        self.lock().fan_log.push(fan_mode);
        self.update(|state| state.fan_mode = Some(fan_mode))
    }

    /// Every setpoint accepted so far, oldest first.
    #[must_use]
    pub fn temperature_log(&self) -> Vec<f64> {
        self.lock().temperature_log.clone()
    }

    /// Every fan mode accepted so far, oldest first.
    #[must_use]
    pub fn fan_log(&self) -> Vec<FanMode> {
        self.lock().fan_log.clone()
    }
}
