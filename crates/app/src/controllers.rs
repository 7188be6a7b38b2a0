//! Climate controllers.
//!
//! Each controller owns its own [`SetpointGate`] and timers and nothing
//! else. Ports are borrowed per call, so controllers never hold a reference
//! to the house between events.

pub mod away;
pub mod circulator;
pub mod night;
pub mod vacation;

pub use away::AwaySetbackController;
pub use circulator::{CirculatorController, CirculatorPhase};
pub use night::{NightPhase, NightSetbackController};
pub use vacation::VacationSetbackController;

use climatehub_domain::hvac::FanMode;
use climatehub_domain::setpoint::SetpointGate;

use crate::ports::Thermostat;

/// Write `target` through `gate`.
///
/// Returns `true` when a command was issued. A target equal to the gate's
/// last applied value issues nothing. Rejected commands are logged and not
/// retried; the gate keeps the target either way.
pub(crate) fn write_setpoint(
    thermostat: &impl Thermostat,
    gate: &mut SetpointGate,
    target: f64,
    controller: &'static str,
) -> bool {
    if !gate.admit(target) {
        tracing::debug!(controller, target, "setpoint unchanged, skipping write");
        return false;
    }
    match thermostat.set_temperature(target) {
        Ok(()) => tracing::info!(controller, target, "setpoint applied"),
        Err(err) => tracing::warn!(controller, target, %err, "failed to apply setpoint"),
    }
    true
}

/// Command the fan unless it already reports `mode`.
pub(crate) fn drive_fan(thermostat: &impl Thermostat, mode: FanMode) {
    if thermostat.state().fan_mode == Some(mode) {
        return;
    }
    if let Err(err) = thermostat.set_fan_mode(mode) {
        tracing::warn!(%err, fan_mode = %mode, "failed to set fan mode");
    }
}
