//! Owned single-timer slot.

use climatehub_domain::event::TimerToken;

use crate::ports::TimerHandle;

/// Holds at most one live timer for a controller.
///
/// Every way of putting a timer in disposes the previous one first, so a
/// controller can never own two live timers of the same slot.
#[derive(Debug, Default)]
pub struct TimerSlot {
    current: Option<TimerHandle>,
}

impl TimerSlot {
    /// An empty slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Dispose whatever is held, then hold `next`.
    pub fn replace(&mut self, next: TimerHandle) {
        self.clear();
        self.current = Some(next);
    }

    /// Dispose whatever is held. Returns `true` if a timer was cancelled.
    pub fn clear(&mut self) -> bool {
        match self.current.take() {
            Some(handle) => {
                handle.dispose();
                true
            }
            None => false,
        }
    }

    /// Whether a timer is held.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.current.is_some()
    }

    /// Token of the held timer.
    #[must_use]
    pub fn token(&self) -> Option<TimerToken> {
        self.current.as_ref().map(TimerHandle::token)
    }

    /// Accept an expiry. Returns `true` and empties the slot only when
    /// `token` is the held timer's; stale or foreign tokens are refused.
    pub fn claim(&mut self, token: TimerToken) -> bool {
        if self.token() == Some(token) {
            self.current = None;
            true
        } else {
            false
        }
    }
}
