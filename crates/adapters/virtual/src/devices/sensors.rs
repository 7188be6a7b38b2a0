//! Virtual read-only sensors: home zone, proximity, weather and alarms.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::replace_if_changed;

#[derive(Debug, Default)]
struct Readings {
    zone_occupants: Option<String>,
    distance: Option<f64>,
    outside_temperature: Option<f64>,
    alarms: HashMap<String, String>,
}

/// Simulated sensor readings. Setters return the previous value when the
/// reading changed, `None` when it did not.
#[derive(Debug, Default)]
pub struct VirtualSensors {
    readings: Mutex<Readings>,
}

impl VirtualSensors {
    #[must_use]
    pub fn new(
        zone_occupants: Option<String>,
        distance: Option<f64>,
        outside_temperature: Option<f64>,
        alarms: HashMap<String, String>,
    ) -> Self {
        Self {
            readings: Mutex::new(Readings {
                zone_occupants,
                distance,
                outside_temperature,
                alarms,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Readings> {
        self.readings.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn zone_occupants(&self) -> Option<String> {
        self.lock().zone_occupants.clone()
    }

    #[must_use]
    pub fn distance(&self) -> Option<f64> {
        self.lock().distance
    }

    #[must_use]
    pub fn outside_temperature(&self) -> Option<f64> {
        self.lock().outside_temperature
    }

    #[must_use]
    pub fn alarm(&self, sensor: &str) -> Option<String> {
        self.lock().alarms.get(sensor).cloned()
    }

    pub fn set_zone_occupants(&self, value: Option<String>) -> Option<Option<String>> {
        replace_if_changed(&mut self.lock().zone_occupants, value)
    }

    pub fn set_distance(&self, value: Option<f64>) -> Option<Option<f64>> {
        replace_if_changed(&mut self.lock().distance, value)
    }

    pub fn set_outside_temperature(&self, value: Option<f64>) -> Option<Option<f64>> {
        replace_if_changed(&mut self.lock().outside_temperature, value)
    }

    pub fn set_alarm(&self, sensor: &str, value: Option<String>) -> Option<Option<String>> {
        let mut readings = self.lock();
        let old = readings.alarms.get(sensor).cloned();
        if old == value {
            return None;
        }
        match value {
            Some(state) => readings.alarms.insert(sensor.to_string(), state),
            None => readings.alarms.remove(sensor),
        };
        Some(old)
    }
}
