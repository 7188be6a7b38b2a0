//! Tokio-backed [`Scheduler`].
//!
//! Every timer is a spawned task that sleeps and then sends its expiry
//! event into the runtime channel. Disposing a handle aborts the task.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{Duration, NaiveTime};
use climatehub_domain::event::{ClimateEvent, DailyTrigger, TimerKind, TimerToken};
use climatehub_domain::time::{self, WallClock, next_occurrence};
use tokio::sync::mpsc;

use crate::ports::{Scheduler, TimerHandle};

/// Scheduler that runs timers on the ambient tokio runtime.
///
/// Must be used from within a tokio runtime; scheduling spawns tasks.
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    events: mpsc::UnboundedSender<ClimateEvent>,
    next_token: Arc<AtomicU64>,
}

impl TokioScheduler {
    /// Deliver expiries to `events`.
    #[must_use]
    pub fn new(events: mpsc::UnboundedSender<ClimateEvent>) -> Self {
        Self {
            events,
            next_token: Arc::new(AtomicU64::new(1)),
        }
    }

    fn allocate(&self) -> TimerToken {
        TimerToken::new(self.next_token.fetch_add(1, Ordering::Relaxed))
    }
}

fn to_std(delay: Duration) -> std::time::Duration {
    delay.to_std().unwrap_or_default()
}

impl Scheduler for TokioScheduler {
    fn now(&self) -> WallClock {
        time::now()
    }

    fn schedule_after(&self, delay: Duration, kind: TimerKind) -> TimerHandle {
        let token = self.allocate();
        let events = self.events.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(to_std(delay)).await;
            if events.send(ClimateEvent::TimerFired { kind, token }).is_err() {
                tracing::debug!(%token, "runtime gone, dropping timer expiry");
            }
        });
        TimerHandle::new(token, move || task.abort())
    }

    fn schedule_daily(&self, at: NaiveTime, trigger: DailyTrigger) -> TimerHandle {
        let token = self.allocate();
        let events = self.events.clone();
        let task = tokio::spawn(async move {
            // each occurrence is derived from the previous one, not from `now`
            let mut next = next_occurrence(time::now(), at);
            loop {
                tokio::time::sleep(to_std(next - time::now())).await;
                if events.send(ClimateEvent::Daily(trigger)).is_err() {
                    tracing::debug!(?trigger, "runtime gone, stopping daily trigger");
                    break;
                }
                next = next_occurrence(next, at);
            }
        });
        TimerHandle::new(token, move || task.abort())
    }
}
