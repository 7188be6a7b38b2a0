//! Port definitions: traits that adapters implement.
//!
//! Ports are the boundaries between the application core and the outside world.
//! They are defined here (in `app`) so that both the controller layer and the
//! adapter layer can depend on them without creating circular dependencies.

pub mod flags;
pub mod notifier;
pub mod scheduler;
pub mod sensors;
pub mod thermostat;

pub use flags::FlagStore;
pub use notifier::Notifier;
pub use scheduler::{Scheduler, TimerHandle};
pub use sensors::SensorReader;
pub use thermostat::Thermostat;

/// Everything a controller may read or command in the house.
///
/// Blanket-implemented for any type providing the three entity ports.
pub trait Home: Thermostat + FlagStore + SensorReader {}

impl<T: Thermostat + FlagStore + SensorReader + ?Sized> Home for T {}
