//! Virtual boolean helpers.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

use climatehub_domain::flag::Flag;

/// The set of flags currently on.
#[derive(Debug, Default)]
pub struct VirtualFlags {
    on: Mutex<HashSet<Flag>>,
}

impl VirtualFlags {
    #[must_use]
    pub fn new(initially_on: impl IntoIterator<Item = Flag>) -> Self {
        Self {
            on: Mutex::new(initially_on.into_iter().collect()),
        }
    }

    #[must_use]
    pub fn is_on(&self, flag: &Flag) -> bool {
        self.on
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(flag)
    }

    /// Set `flag`. Returns `true` if its value changed.
    pub fn set(&self, flag: &Flag, on: bool) -> bool {
        let mut set = self.on.lock().unwrap_or_else(PoisonError::into_inner);
        if on {
            set.insert(flag.clone())
        } else {
            set.remove(flag)
        }
    }
}
