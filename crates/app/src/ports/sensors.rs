//! Sensor port: read-only observations.

use std::sync::Arc;

/// Reads the sensors the climate engine depends on.
///
/// Every reading may be missing; callers apply their own fallbacks.
pub trait SensorReader: Send + Sync {
    /// Raw occupant count of the home zone.
    fn zone_occupants(&self) -> Option<String>;

    /// Distance in miles of the nearest occupant from home.
    fn nearest_distance(&self) -> Option<f64>;

    /// Outside temperature in °F.
    fn outside_temperature(&self) -> Option<f64>;

    /// Raw state of a next-alarm sensor.
    fn next_alarm(&self, sensor: &str) -> Option<String>;
}

impl<T: SensorReader + ?Sized> SensorReader for Arc<T> {
    fn zone_occupants(&self) -> Option<String> {
        (**self).zone_occupants()
    }

    fn nearest_distance(&self) -> Option<f64> {
        (**self).nearest_distance()
    }

    fn outside_temperature(&self) -> Option<f64> {
        (**self).outside_temperature()
    }

    fn next_alarm(&self, sensor: &str) -> Option<String> {
        (**self).next_alarm(sensor)
    }
}
