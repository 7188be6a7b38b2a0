//! Virtual device state: thermostat, flags, sensors.
//!
//! Each device keeps its state behind a [`Mutex`](std::sync::Mutex) and
//! reports whether a mutation actually changed anything, so the home can
//! echo only genuine changes.

mod flags;
mod sensors;
mod thermostat;

pub use flags::VirtualFlags;
pub use sensors::VirtualSensors;
pub use thermostat::VirtualThermostat;

/// Store `new` in `slot`, returning the previous value if it differed.
pub(crate) fn replace_if_changed<T: PartialEq>(slot: &mut T, new: T) -> Option<T> {
    if *slot == new {
        None
    } else {
        Some(std::mem::replace(slot, new))
    }
}
