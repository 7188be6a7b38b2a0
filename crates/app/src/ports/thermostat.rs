//! Thermostat port: the single shared HVAC actuator.
//!
//! Several controllers write to it without locking; see the runtime for how
//! mode windows keep them apart.

use std::sync::Arc;

use climatehub_domain::error::ClimateError;
use climatehub_domain::hvac::{FanMode, ThermostatState};

/// Reads and commands the thermostat entity.
pub trait Thermostat: Send + Sync {
    /// Current state and attributes.
    fn state(&self) -> ThermostatState;

    /// Issue a "set temperature" command.
    ///
    /// # Errors
    ///
    /// Returns [`ClimateError::Command`] if the platform rejects the command.
    fn set_temperature(&self, temperature: f64) -> Result<(), ClimateError>;

    /// Issue a "set fan mode" command.
    ///
    /// # Errors
    ///
    /// Returns [`ClimateError::Command`] if the platform rejects the command.
    fn set_fan_mode(&self, fan_mode: FanMode) -> Result<(), ClimateError>;
}

impl<T: Thermostat + ?Sized> Thermostat for Arc<T> {
    fn state(&self) -> ThermostatState {
        (**self).state()
    }

    fn set_temperature(&self, temperature: f64) -> Result<(), ClimateError> {
        (**self).set_temperature(temperature)
    }

    fn set_fan_mode(&self, fan_mode: FanMode) -> Result<(), ClimateError> {
        (**self).set_fan_mode(fan_mode)
    }
}
