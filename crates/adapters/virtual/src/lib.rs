//! # climatehub-adapter-virtual
//!
//! Simulated house for demos and end-to-end tests.
//!
//! ## Provided pieces
//!
//! | Piece | Port | Behaviour |
//! |-------|------|-----------|
//! | [`VirtualHome`] | `Thermostat`, `FlagStore`, `SensorReader` | Holds state, echoes every change as a [`ClimateEvent`] |
//! | [`VirtualScheduler`] | `Scheduler` | Manual clock, timers fired on request |
//! | [`TracingNotifier`] | `Notifier` | Logs messages and keeps a copy |
//!
//! Commands issued by the engine are echoed too, the way a real home
//! platform reports the entity change that follows a service call.
//!
//! ## Dependency rule
//!
//! Depends on `climatehub-app` (port traits) and `climatehub-domain` only.

mod clock;
mod devices;
mod notifier;

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use climatehub_app::ports::{FlagStore, SensorReader, Thermostat};
use climatehub_domain::error::{ClimateError, CommandError};
use climatehub_domain::event::ClimateEvent;
use climatehub_domain::flag::Flag;
use climatehub_domain::hvac::{FanMode, HvacAction, ThermostatState};
use tokio::sync::mpsc::UnboundedSender;

pub use clock::VirtualScheduler;
pub use devices::{VirtualFlags, VirtualSensors, VirtualThermostat};
pub use notifier::TracingNotifier;

const THERMOSTAT_ENTITY: &str = "climate.thermostat";

/// Initial state of a [`VirtualHome`].
#[derive(Debug, Clone, Default)]
pub struct VirtualHomeState {
    pub thermostat: ThermostatState,
    pub zone_occupants: Option<String>,
    pub distance: Option<f64>,
    pub outside_temperature: Option<f64>,
    pub alarms: HashMap<String, String>,
    /// Flags that start on.
    pub flags: Vec<Flag>,
}

/// A simulated house.
///
/// Every change, whether made through a simulation setter or by a command
/// from the engine, is sent on the event channel. Unchanged values are not
/// echoed.
#[derive(Debug)]
pub struct VirtualHome {
    thermostat: VirtualThermostat,
    flags: VirtualFlags,
    sensors: VirtualSensors,
    available: AtomicBool,
    events: UnboundedSender<ClimateEvent>,
}

impl VirtualHome {
    #[must_use]
    pub fn new(initial: VirtualHomeState, events: UnboundedSender<ClimateEvent>) -> Self {
        Self {
            thermostat: VirtualThermostat::new(initial.thermostat),
            flags: VirtualFlags::new(initial.flags),
            sensors: VirtualSensors::new(
                initial.zone_occupants,
                initial.distance,
                initial.outside_temperature,
                initial.alarms,
            ),
            available: AtomicBool::new(true),
            events,
        }
    }

    /// Make every command fail with [`CommandError::Unavailable`].
    pub fn set_available(&self, available: bool) {
        tracing::info!(available, "virtual home availability changed");
        self.available.store(available, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    fn emit(&self, event: ClimateEvent) {
        tracing::debug!(?event, "virtual home change");
        // The runtime may already be gone during shutdown.
        let _ = self.events.send(event);
    }

    fn ensure_available(&self, target: String) -> Result<(), ClimateError> {
        if self.is_available() {
            Ok(())
        } else {
            Err(CommandError::Unavailable { target }.into())
        }
    }

    fn emit_thermostat(&self, change: Option<(ThermostatState, ThermostatState)>) {
        if let Some((old, new)) = change {
            self.emit(ClimateEvent::ThermostatChanged { old, new });
        }
    }

    fn write_flag(&self, flag: &Flag, on: bool) {
        if self.flags.set(flag, on) {
            self.emit(ClimateEvent::FlagChanged {
                flag: flag.clone(),
                old: !on,
                new: on,
            });
        }
    }

    // -- simulation ---------------------------------------------------------

    pub fn set_zone_occupants(&self, value: Option<&str>) {
        let new = value.map(str::to_string);
        if let Some(old) = self.sensors.set_zone_occupants(new.clone()) {
            self.emit(ClimateEvent::ZoneOccupantsChanged { old, new });
        }
    }

    pub fn set_distance(&self, value: Option<f64>) {
        if let Some(old) = self.sensors.set_distance(value) {
            self.emit(ClimateEvent::DistanceChanged { old, new: value });
        }
    }

    pub fn set_outside_temperature(&self, value: Option<f64>) {
        if let Some(old) = self.sensors.set_outside_temperature(value) {
            self.emit(ClimateEvent::OutsideTemperatureChanged { old, new: value });
        }
    }

    pub fn set_alarm(&self, sensor: &str, value: Option<&str>) {
        let new = value.map(str::to_string);
        if let Some(old) = self.sensors.set_alarm(sensor, new.clone()) {
            self.emit(ClimateEvent::AlarmChanged {
                sensor: sensor.to_string(),
                old,
                new,
            });
        }
    }

    /// Flip a flag as a person would from the dashboard.
    pub fn set_flag(&self, flag: &Flag, on: bool) {
        self.write_flag(flag, on);
    }

    pub fn set_hvac_mode(&self, mode: &str) {
        let change = self.thermostat.update(|state| state.mode = mode.to_string());
        self.emit_thermostat(change);
    }

    pub fn set_hvac_action(&self, action: Option<HvacAction>) {
        let change = self.thermostat.update(|state| state.action = action);
        self.emit_thermostat(change);
    }

    // -- inspection ---------------------------------------------------------

    #[must_use]
    pub fn thermostat(&self) -> ThermostatState {
        self.thermostat.snapshot()
    }

    /// Setpoints accepted from the engine, oldest first.
    #[must_use]
    pub fn temperature_log(&self) -> Vec<f64> {
        self.thermostat.temperature_log()
    }

    /// Fan modes accepted from the engine, oldest first.
    #[must_use]
    pub fn fan_log(&self) -> Vec<FanMode> {
        self.thermostat.fan_log()
    }
}

impl Thermostat for VirtualHome {
    fn state(&self) -> ThermostatState {
        self.thermostat.snapshot()
    }

    fn set_temperature(&self, temperature: f64) -> Result<(), ClimateError> {
        self.ensure_available(THERMOSTAT_ENTITY.to_string())?;
        let change = self.thermostat.command_temperature(temperature);
        self.emit_thermostat(change);
        Ok(())
    }

    fn set_fan_mode(&self, fan_mode: FanMode) -> Result<(), ClimateError> {
        self.ensure_available(THERMOSTAT_ENTITY.to_string())?;
        let change = self.thermostat.command_fan(fan_mode);
        self.emit_thermostat(change);
        Ok(())
    }
}

impl FlagStore for VirtualHome {
    fn is_on(&self, flag: &Flag) -> bool {
        self.flags.is_on(flag)
    }

    fn turn_on(&self, flag: &Flag) -> Result<(), ClimateError> {
        self.ensure_available(flag.entity_id())?;
        self.write_flag(flag, true);
        Ok(())
    }

    fn turn_off(&self, flag: &Flag) -> Result<(), ClimateError> {
        self.ensure_available(flag.entity_id())?;
        self.write_flag(flag, false);
        Ok(())
    }
}

impl SensorReader for VirtualHome {
    fn zone_occupants(&self) -> Option<String> {
        self.sensors.zone_occupants()
    }

    fn nearest_distance(&self) -> Option<f64> {
        self.sensors.distance()
    }

    fn outside_temperature(&self) -> Option<f64> {
        self.sensors.outside_temperature()
    }

    fn next_alarm(&self, sensor: &str) -> Option<String> {
        self.sensors.alarm(sensor)
    }
}
