//! # climatehub-app
//!
//! Application layer: climate controllers and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `Thermostat`: read HVAC state, set temperature and fan mode
//!   - `FlagStore`: read and command boolean flags
//!   - `SensorReader`: zone occupancy, distance, outside temperature, alarms
//!   - `Scheduler`: wall clock, one-shot and daily timers
//!   - `Notifier`: human-facing messages
//! - Provide the **controllers** (away, vacation, night, circulator) and the
//!   `OccupancyModeEngine` they key off
//! - Provide the `ClimateRuntime` that feeds events to controllers one at a time
//! - Provide **in-process infrastructure** that doesn't need IO (tokio-backed scheduler)
//!
//! ## Dependency rule
//! Depends on `climatehub-domain` only (plus `tokio` for channels and timers).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod controllers;
pub mod exclusion;
pub mod mode_engine;
pub mod ports;
pub mod runtime;
pub mod scheduler;
pub mod timer;

#[cfg(test)]
pub(crate) mod testing;
