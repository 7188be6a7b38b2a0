//! Vacation and guest are mutually exclusive household flags.
//!
//! The mode precedence already resolves both being on (vacation wins), so
//! this handler only keeps the flags themselves tidy: switching one on
//! switches the other off.

use climatehub_domain::flag::Flag;

use crate::ports::FlagStore;
use crate::ports::flags::switch_off;

/// Turns the opposite occupancy flag off when one is turned on.
#[derive(Debug, Default, Clone, Copy)]
pub struct ModeFlagExclusion;

impl ModeFlagExclusion {
    /// React to a flag change. Only rising edges of vacation or guest act.
    ///
    /// Returns the flag that was switched off, if any.
    pub fn on_flag_changed(
        flags: &impl FlagStore,
        flag: &Flag,
        old: bool,
        new: bool,
    ) -> Option<Flag> {
        if old || !new {
            return None;
        }
        let opposite = match flag {
            Flag::Vacation => Flag::Guest,
            Flag::Guest => Flag::Vacation,
            _ => return None,
        };
        if !flags.is_on(&opposite) {
            return None;
        }
        tracing::info!(%flag, %opposite, "switching off mutually exclusive flag");
        switch_off(flags, &opposite);
        Some(opposite)
    }
}
