//! Manual clock: a [`Scheduler`] whose time only moves when told to.
//!
//! Timers are kept in a list and handed out in due order by
//! [`fire_next_due`](VirtualScheduler::fire_next_due), which makes whole
//! nights or duty cycles reproducible in tests.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{Duration, NaiveTime};
use climatehub_app::ports::{Scheduler, TimerHandle};
use climatehub_domain::event::{ClimateEvent, DailyTrigger, TimerKind, TimerToken};
use climatehub_domain::time::{WallClock, next_occurrence};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Schedule {
    Once(TimerKind),
    Daily(NaiveTime, DailyTrigger),
}

#[derive(Debug, Clone, Copy)]
struct PendingTimer {
    token: TimerToken,
    due: WallClock,
    schedule: Schedule,
}

#[derive(Debug)]
struct ClockState {
    now: WallClock,
    next_token: u64,
    timers: Vec<PendingTimer>,
}

/// Virtual scheduler driven by the caller.
#[derive(Debug, Clone)]
pub struct VirtualScheduler {
    inner: Arc<Mutex<ClockState>>,
}

impl VirtualScheduler {
    /// A clock stopped at `start`.
    #[must_use]
    pub fn new(start: WallClock) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ClockState {
                now: start,
                next_token: 1,
                timers: Vec::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ClockState> {
        lock(&self.inner)
    }

    /// Move the clock without firing anything.
    pub fn set_now(&self, now: WallClock) {
        self.lock().now = now;
    }

    /// Number of live timers, daily triggers included.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.lock().timers.len()
    }

    /// When the earliest live timer is due.
    #[must_use]
    pub fn next_due(&self) -> Option<WallClock> {
        self.lock().timers.iter().map(|timer| timer.due).min()
    }

    /// Fire the earliest timer due at or before `until`.
    ///
    /// The clock moves to that timer's due time and its event is returned;
    /// one-shot timers are removed and daily triggers re-armed for the next
    /// day. When nothing is due the clock moves to `until` and `None` is
    /// returned.
    pub fn fire_next_due(&self, until: WallClock) -> Option<ClimateEvent> {
        let mut state = self.lock();
        let next = state
            .timers
            .iter()
            .enumerate()
            .filter(|(_, timer)| timer.due <= until)
            .min_by_key(|(_, timer)| (timer.due, timer.token))
            .map(|(index, _)| index);

        let Some(index) = next else {
            if until > state.now {
                state.now = until;
            }
            return None;
        };

        let timer = state.timers[index];
        if timer.due > state.now {
            state.now = timer.due;
        }
        match timer.schedule {
            Schedule::Once(kind) => {
                state.timers.remove(index);
                Some(ClimateEvent::TimerFired {
                    kind,
                    token: timer.token,
                })
            }
            Schedule::Daily(at, trigger) => {
                state.timers[index].due = next_occurrence(timer.due, at);
                Some(ClimateEvent::Daily(trigger))
            }
        }
    }

    fn arm(&self, due: WallClock, schedule: Schedule) -> TimerHandle {
        let token = {
            let mut state = self.lock();
            let token = TimerToken::new(state.next_token);
            state.next_token += 1;
            state.timers.push(PendingTimer {
                token,
                due,
                schedule,
            });
            token
        };
        let inner = Arc::clone(&self.inner);
        TimerHandle::new(token, move || {
            lock(&inner).timers.retain(|timer| timer.token != token);
        })
    }
}

fn lock(inner: &Mutex<ClockState>) -> MutexGuard<'_, ClockState> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Scheduler for VirtualScheduler {
    fn now(&self) -> WallClock {
        self.lock().now
    }

    fn schedule_after(&self, delay: Duration, kind: TimerKind) -> TimerHandle {
        let due = self.now() + delay.max(Duration::zero());
        self.arm(due, Schedule::Once(kind))
    }

    fn schedule_daily(&self, at: NaiveTime, trigger: DailyTrigger) -> TimerHandle {
        let due = next_occurrence(self.now(), at);
        self.arm(due, Schedule::Daily(at, trigger))
    }
}
