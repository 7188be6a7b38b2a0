//! Scheduler port: wall clock plus cancellable timers.
//!
//! Timers never call back into controllers directly. When one expires the
//! scheduler delivers [`ClimateEvent::TimerFired`] (or
//! [`ClimateEvent::Daily`]) to the runtime, which routes it by kind and token.
//!
//! [`ClimateEvent::TimerFired`]: climatehub_domain::event::ClimateEvent::TimerFired
//! [`ClimateEvent::Daily`]: climatehub_domain::event::ClimateEvent::Daily

use std::fmt;
use std::sync::Arc;

use chrono::{Duration, NaiveTime};
use climatehub_domain::event::{DailyTrigger, TimerKind, TimerToken};
use climatehub_domain::time::WallClock;

/// Owned handle to a scheduled timer.
///
/// [`dispose`](Self::dispose) cancels the timer. Disposing a timer that has
/// already fired is a no-op. Dropping a handle without disposing it leaves
/// the timer running; its expiry is then ignored because no controller holds
/// the token any more.
pub struct TimerHandle {
    token: TimerToken,
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl TimerHandle {
    /// Wrap a token with the closure that cancels it.
    pub fn new(token: TimerToken, cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            token,
            cancel: Some(Box::new(cancel)),
        }
    }

    /// The token the expiry event will carry.
    #[must_use]
    pub fn token(&self) -> TimerToken {
        self.token
    }

    /// Cancel the timer.
    pub fn dispose(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl fmt::Debug for TimerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerHandle")
            .field("token", &self.token)
            .finish_non_exhaustive()
    }
}

/// Clock and timer capability.
pub trait Scheduler: Send + Sync {
    /// Current local wall-clock time.
    fn now(&self) -> WallClock;

    /// Fire a `kind` timer after `delay`. Negative delays fire immediately.
    fn schedule_after(&self, delay: Duration, kind: TimerKind) -> TimerHandle;

    /// Fire a `kind` timer at `at`. Instants in the past fire immediately.
    fn schedule_at(&self, at: WallClock, kind: TimerKind) -> TimerHandle {
        let delay = (at - self.now()).max(Duration::zero());
        self.schedule_after(delay, kind)
    }

    /// Fire `trigger` every day at `at` until the handle is disposed.
    fn schedule_daily(&self, at: NaiveTime, trigger: DailyTrigger) -> TimerHandle;
}

impl<T: Scheduler + ?Sized> Scheduler for Arc<T> {
    fn now(&self) -> WallClock {
        (**self).now()
    }

    fn schedule_after(&self, delay: Duration, kind: TimerKind) -> TimerHandle {
        (**self).schedule_after(delay, kind)
    }

    fn schedule_at(&self, at: WallClock, kind: TimerKind) -> TimerHandle {
        (**self).schedule_at(at, kind)
    }

    fn schedule_daily(&self, at: NaiveTime, trigger: DailyTrigger) -> TimerHandle {
        (**self).schedule_daily(at, trigger)
    }
}
