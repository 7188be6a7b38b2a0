//! # climatehub-domain
//!
//! Pure domain model for the climatehub climate control engine.
//!
//! ## Responsibilities
//! - Foundational types: error conventions, wall-clock helpers
//! - Define **occupancy modes** and the precedence rule that derives them
//! - Define **HVAC state** (operating mode, action, fan mode) as reported by the thermostat
//! - Define **setpoint maths** (limits, distance scaling, the idempotence gate)
//! - Define **recovery planning** (alarm selection, lead time)
//! - Define **events** consumed by the runtime and the **settings** that tune it
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod time;

pub mod alarm;
pub mod event;
pub mod flag;
pub mod hvac;
pub mod mode;
pub mod recovery;
pub mod settings;
pub mod setpoint;
