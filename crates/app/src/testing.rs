//! In-memory fakes shared by the controller and runtime tests.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{Duration, NaiveDate, NaiveTime};
use climatehub_domain::error::{ClimateError, CommandError};
use climatehub_domain::event::{DailyTrigger, TimerKind, TimerToken};
use climatehub_domain::flag::Flag;
use climatehub_domain::hvac::{FanMode, HvacAction, ThermostatState};
use climatehub_domain::time::WallClock;

use crate::ports::{FlagStore, Scheduler, SensorReader, Thermostat, TimerHandle};

/// Wall-clock helper: January `d`, 2026 at `h:m`.
pub(crate) fn jan(d: u32, h: u32, m: u32) -> WallClock {
    NaiveDate::from_ymd_opt(2026, 1, d)
        .unwrap()
        .and_hms_opt(h, m, 0)
        .unwrap()
}

// ── Fake home ──────────────────────────────────────────────────

#[derive(Default)]
pub(crate) struct FakeHomeState {
    pub thermostat: ThermostatState,
    pub flags: HashSet<Flag>,
    pub zone: Option<String>,
    pub distance: Option<f64>,
    pub outside: Option<f64>,
    pub alarms: HashMap<String, String>,
    pub temperature_writes: Vec<f64>,
    pub fan_writes: Vec<FanMode>,
    pub flag_commands: Vec<(Flag, bool)>,
    pub reject_commands: bool,
}

#[derive(Default)]
pub(crate) struct FakeHome {
    state: Mutex<FakeHomeState>,
}

impl FakeHome {
    pub fn with_mode(mode: &str) -> Self {
        let home = Self::default();
        {
            let mut state = home.lock();
            state.thermostat.mode = mode.to_string();
            state.thermostat.action = Some(HvacAction::Idle);
            state.zone = Some("0".to_string());
        }
        home
    }

    pub fn heating() -> Self {
        Self::with_mode("heat")
    }

    pub fn cooling() -> Self {
        Self::with_mode("cool")
    }

    pub fn lock(&self) -> MutexGuard<'_, FakeHomeState> {
        self.state.lock().unwrap()
    }

    pub fn set_mode(&self, mode: &str) {
        self.lock().thermostat.mode = mode.to_string();
    }

    pub fn set_action(&self, action: Option<HvacAction>) {
        self.lock().thermostat.action = action;
    }

    pub fn set_flag(&self, flag: Flag, on: bool) {
        let mut state = self.lock();
        if on {
            state.flags.insert(flag);
        } else {
            state.flags.remove(&flag);
        }
    }

    pub fn set_zone(&self, zone: &str) {
        self.lock().zone = Some(zone.to_string());
    }

    pub fn set_distance(&self, distance: Option<f64>) {
        self.lock().distance = distance;
    }

    pub fn set_outside(&self, outside: Option<f64>) {
        self.lock().outside = outside;
    }

    pub fn set_alarm(&self, sensor: &str, value: &str) {
        self.lock()
            .alarms
            .insert(sensor.to_string(), value.to_string());
    }

    pub fn reject_commands(&self) {
        self.lock().reject_commands = true;
    }

    pub fn temperature_writes(&self) -> Vec<f64> {
        self.lock().temperature_writes.clone()
    }

    pub fn fan_writes(&self) -> Vec<FanMode> {
        self.lock().fan_writes.clone()
    }

    pub fn flag_commands(&self) -> Vec<(Flag, bool)> {
        self.lock().flag_commands.clone()
    }

    fn rejected(target: &str, command: &'static str) -> ClimateError {
        CommandError::Rejected {
            target: target.to_string(),
            command,
        }
        .into()
    }
}

impl Thermostat for FakeHome {
    fn state(&self) -> ThermostatState {
        self.lock().thermostat.clone()
    }

    fn set_temperature(&self, temperature: f64) -> Result<(), ClimateError> {
        let mut state = self.lock();
        state.temperature_writes.push(temperature);
        if state.reject_commands {
            return Err(Self::rejected("climate.thermostat", "set_temperature"));
        }
        state.thermostat.setpoint = Some(temperature);
        Ok(())
    }

    fn set_fan_mode(&self, fan_mode: FanMode) -> Result<(), ClimateError> {
        let mut state = self.lock();
        state.fan_writes.push(fan_mode);
        if state.reject_commands {
            return Err(Self::rejected("climate.thermostat", "set_fan_mode"));
        }
        state.thermostat.fan_mode = Some(fan_mode);
        Ok(())
    }
}

impl FlagStore for FakeHome {
    fn is_on(&self, flag: &Flag) -> bool {
        self.lock().flags.contains(flag)
    }

    fn turn_on(&self, flag: &Flag) -> Result<(), ClimateError> {
        let mut state = self.lock();
        state.flag_commands.push((flag.clone(), true));
        if state.reject_commands {
            return Err(Self::rejected(&flag.entity_id(), "turn_on"));
        }
        state.flags.insert(flag.clone());
        Ok(())
    }

    fn turn_off(&self, flag: &Flag) -> Result<(), ClimateError> {
        let mut state = self.lock();
        state.flag_commands.push((flag.clone(), false));
        if state.reject_commands {
            return Err(Self::rejected(&flag.entity_id(), "turn_off"));
        }
        state.flags.remove(flag);
        Ok(())
    }
}

impl SensorReader for FakeHome {
    fn zone_occupants(&self) -> Option<String> {
        self.lock().zone.clone()
    }

    fn nearest_distance(&self) -> Option<f64> {
        self.lock().distance
    }

    fn outside_temperature(&self) -> Option<f64> {
        self.lock().outside
    }

    fn next_alarm(&self, sensor: &str) -> Option<String> {
        self.lock().alarms.get(sensor).cloned()
    }
}

// ── Fake scheduler ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Scheduled {
    pub token: TimerToken,
    pub kind: TimerKind,
    pub at: WallClock,
}

struct FakeSchedulerState {
    now: WallClock,
    next_token: u64,
    pending: Vec<Scheduled>,
    daily: Vec<(NaiveTime, DailyTrigger, TimerToken)>,
    cancelled: Vec<TimerToken>,
}

/// Records timers instead of running them; tests fire them by hand.
#[derive(Clone)]
pub(crate) struct FakeScheduler {
    inner: Arc<Mutex<FakeSchedulerState>>,
}

impl FakeScheduler {
    pub fn at(now: WallClock) -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeSchedulerState {
                now,
                next_token: 1,
                pending: Vec::new(),
                daily: Vec::new(),
                cancelled: Vec::new(),
            })),
        }
    }

    pub fn set_now(&self, now: WallClock) {
        self.inner.lock().unwrap().now = now;
    }

    pub fn pending(&self) -> Vec<Scheduled> {
        self.inner.lock().unwrap().pending.clone()
    }

    pub fn pending_of(&self, kind: TimerKind) -> Vec<Scheduled> {
        self.pending()
            .into_iter()
            .filter(|s| s.kind == kind)
            .collect()
    }

    pub fn daily(&self) -> Vec<(NaiveTime, DailyTrigger)> {
        self.inner
            .lock()
            .unwrap()
            .daily
            .iter()
            .map(|(at, trigger, _)| (*at, *trigger))
            .collect()
    }

    pub fn cancelled(&self) -> Vec<TimerToken> {
        self.inner.lock().unwrap().cancelled.clone()
    }

    /// Remove a pending timer as if it had fired, returning it.
    pub fn take(&self, token: TimerToken) -> Option<Scheduled> {
        let mut state = self.inner.lock().unwrap();
        let index = state.pending.iter().position(|s| s.token == token)?;
        Some(state.pending.remove(index))
    }

    fn allocate(&self) -> TimerToken {
        let mut state = self.inner.lock().unwrap();
        let token = TimerToken::new(state.next_token);
        state.next_token += 1;
        token
    }

    fn canceller(&self, token: TimerToken) -> impl FnOnce() + Send + 'static {
        let inner = Arc::clone(&self.inner);
        move || {
            let mut state = inner.lock().unwrap();
            state.pending.retain(|s| s.token != token);
            state.daily.retain(|(_, _, t)| *t != token);
            state.cancelled.push(token);
        }
    }
}

impl Scheduler for FakeScheduler {
    fn now(&self) -> WallClock {
        self.inner.lock().unwrap().now
    }

    fn schedule_after(&self, delay: Duration, kind: TimerKind) -> TimerHandle {
        let token = self.allocate();
        {
            let mut state = self.inner.lock().unwrap();
            let at = state.now + delay.max(Duration::zero());
            state.pending.push(Scheduled { token, kind, at });
        }
        TimerHandle::new(token, self.canceller(token))
    }

    fn schedule_daily(&self, at: NaiveTime, trigger: DailyTrigger) -> TimerHandle {
        let token = self.allocate();
        self.inner
            .lock()
            .unwrap()
            .daily
            .push((at, trigger, token));
        TimerHandle::new(token, self.canceller(token))
    }
}
