//! Fan circulation duty cycle.
//!
//! While enabled and the equipment is resting, the fan alternates between
//! `on` and `auto`. Active heating or cooling stops the cycle; when it ends
//! a quiet period passes before cycling resumes.

use climatehub_domain::event::{TimerKind, TimerToken};
use climatehub_domain::flag::Flag;
use climatehub_domain::hvac::{FanMode, ThermostatState};
use climatehub_domain::settings::CirculatorSettings;

use super::drive_fan;
use crate::ports::{Home, Scheduler};
use crate::timer::TimerSlot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CirculatorPhase {
    #[default]
    Idle,
    /// Dwelling with the fan in this mode.
    Cycling(FanMode),
    /// Waiting out the quiet period after heating/cooling.
    Quiet,
}

#[derive(Debug)]
pub struct CirculatorController {
    settings: CirculatorSettings,
    phase: CirculatorPhase,
    timer: TimerSlot,
}

impl CirculatorController {
    #[must_use]
    pub fn new(settings: CirculatorSettings) -> Self {
        Self {
            settings,
            phase: CirculatorPhase::Idle,
            timer: TimerSlot::new(),
        }
    }

    /// Start cycling if the flag is already on and the equipment is resting.
    pub fn start(&mut self, home: &impl Home, scheduler: &impl Scheduler) {
        if home.is_on(&Flag::Circulator) && home.state().is_resting() {
            self.begin_cycle(home, scheduler);
        }
    }

    pub fn on_enabled_changed(
        &mut self,
        home: &impl Home,
        scheduler: &impl Scheduler,
        enabled: bool,
    ) {
        if !enabled {
            tracing::info!("circulator disabled");
            self.stop(home);
            return;
        }
        let state = home.state();
        if state.is_resting() {
            self.begin_cycle(home, scheduler);
        } else {
            tracing::debug!(action = ?state.action, "circulator enabled, waiting for equipment to rest");
        }
    }

    pub fn on_thermostat_changed(
        &mut self,
        home: &impl Home,
        scheduler: &impl Scheduler,
        old: &ThermostatState,
        new: &ThermostatState,
    ) {
        let was_active = old.is_active();
        let is_active = new.is_active();
        if !was_active && is_active {
            if self.phase != CirculatorPhase::Idle {
                tracing::info!(action = ?new.action, "equipment active, pausing circulation");
                self.stop(home);
            }
        } else if was_active && !is_active && home.is_on(&Flag::Circulator) {
            self.timer.clear();
            drive_fan(home, FanMode::Auto);
            self.timer.replace(
                scheduler.schedule_after(self.settings.quiet_period(), TimerKind::Circulator),
            );
            self.phase = CirculatorPhase::Quiet;
            tracing::debug!(quiet_minutes = self.settings.quiet_minutes, "equipment rested, quiet period started");
        }
    }

    pub fn on_timer_fired(&mut self, home: &impl Home, scheduler: &impl Scheduler, token: TimerToken) {
        if !self.timer.claim(token) {
            tracing::debug!(%token, "ignoring stale circulator timer");
            return;
        }
        match self.phase {
            CirculatorPhase::Cycling(fan_mode) => {
                self.dwell(home, scheduler, fan_mode.toggled());
            }
            CirculatorPhase::Quiet => {
                // a cleared (`None`) action counts as ended here
                if home.is_on(&Flag::Circulator) && !home.state().is_active() {
                    self.begin_cycle(home, scheduler);
                } else {
                    tracing::debug!("quiet period over, circulation not resumed");
                    self.phase = CirculatorPhase::Idle;
                }
            }
            CirculatorPhase::Idle => {}
        }
    }

    /// Dispose the duty timer without touching the fan.
    pub fn shutdown(&mut self) {
        self.timer.clear();
        self.phase = CirculatorPhase::Idle;
    }

    #[must_use]
    pub fn phase(&self) -> CirculatorPhase {
        self.phase
    }

    /// Token of the live duty or quiet timer.
    #[must_use]
    pub fn timer_token(&self) -> Option<TimerToken> {
        self.timer.token()
    }

    fn begin_cycle(&mut self, home: &impl Home, scheduler: &impl Scheduler) {
        tracing::info!(
            on_minutes = self.settings.on_minutes,
            auto_minutes = self.settings.auto_minutes,
            "circulation started"
        );
        self.dwell(home, scheduler, FanMode::On);
    }

    fn dwell(&mut self, home: &impl Home, scheduler: &impl Scheduler, fan_mode: FanMode) {
        self.timer.clear();
        drive_fan(home, fan_mode);
        let dwell = match fan_mode {
            FanMode::On => self.settings.on_dwell(),
            FanMode::Auto => self.settings.auto_dwell(),
        };
        self.timer
            .replace(scheduler.schedule_after(dwell, TimerKind::Circulator));
        self.phase = CirculatorPhase::Cycling(fan_mode);
    }

    fn stop(&mut self, home: &impl Home) {
        self.timer.clear();
        drive_fan(home, FanMode::Auto);
        self.phase = CirculatorPhase::Idle;
    }
}
