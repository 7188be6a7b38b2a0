//! Flag port: boolean helper entities.

use std::sync::Arc;

use climatehub_domain::error::ClimateError;
use climatehub_domain::flag::Flag;

/// Reads and commands boolean flags.
pub trait FlagStore: Send + Sync {
    /// Whether the flag is currently on. Unknown flags read as off.
    fn is_on(&self, flag: &Flag) -> bool;

    /// Turn the flag on.
    ///
    /// # Errors
    ///
    /// Returns [`ClimateError::Command`] if the platform rejects the command.
    fn turn_on(&self, flag: &Flag) -> Result<(), ClimateError>;

    /// Turn the flag off.
    ///
    /// # Errors
    ///
    /// Returns [`ClimateError::Command`] if the platform rejects the command.
    fn turn_off(&self, flag: &Flag) -> Result<(), ClimateError>;
}

impl<T: FlagStore + ?Sized> FlagStore for Arc<T> {
    fn is_on(&self, flag: &Flag) -> bool {
        (**self).is_on(flag)
    }

    fn turn_on(&self, flag: &Flag) -> Result<(), ClimateError> {
        (**self).turn_on(flag)
    }

    fn turn_off(&self, flag: &Flag) -> Result<(), ClimateError> {
        (**self).turn_off(flag)
    }
}

/// Turn a flag off, logging instead of failing.
pub(crate) fn switch_off(flags: &impl FlagStore, flag: &Flag) {
    if let Err(err) = flags.turn_off(flag) {
        tracing::warn!(%err, %flag, "failed to turn flag off");
    }
}

/// Turn a flag on, logging instead of failing.
pub(crate) fn switch_on(flags: &impl FlagStore, flag: &Flag) {
    if let Err(err) = flags.turn_on(flag) {
        tracing::warn!(%err, %flag, "failed to turn flag on");
    }
}
