//! Night setback: overnight setback with alarm-driven recovery.
//!
//! One night runs `Idle → SetbackApplied → RecoveryScheduled → Idle`. The
//! recovery instant is re-planned whenever an alarm sensor changes; the
//! previous timer is always disposed before the new one is armed.

use climatehub_domain::alarm::parse_alarm;
use climatehub_domain::event::{TimerKind, TimerToken};
use climatehub_domain::flag::Flag;
use climatehub_domain::setpoint::{SetpointGate, SetpointLimits};
use climatehub_domain::settings::NightSettings;
use climatehub_domain::time::WallClock;

use super::write_setpoint;
use crate::ports::flags::{switch_off, switch_on};
use crate::ports::{Home, Scheduler};
use crate::timer::TimerSlot;

const NAME: &str = "night";

/// Where the current night stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NightPhase {
    #[default]
    Idle,
    /// Setback written, no recovery armed yet.
    SetbackApplied,
    /// Recovery timer armed.
    RecoveryScheduled,
}

#[derive(Debug)]
pub struct NightSetbackController {
    limits: SetpointLimits,
    settings: NightSettings,
    gate: SetpointGate,
    recovery: TimerSlot,
    recover_at: Option<WallClock>,
    phase: NightPhase,
}

impl NightSetbackController {
    #[must_use]
    pub fn new(limits: SetpointLimits, settings: NightSettings) -> Self {
        Self {
            limits,
            settings,
            gate: SetpointGate::new(),
            recovery: TimerSlot::new(),
            recover_at: None,
            phase: NightPhase::Idle,
        }
    }

    /// Catch up after a restart during the night: the setback is assumed
    /// to be in place already, so only recovery is planned.
    pub fn start(&mut self, home: &impl Home, scheduler: &impl Scheduler) {
        if home.is_on(&Flag::NightMode) && !home.is_on(&Flag::Vacation) {
            tracing::info!("night mode already on at startup, planning recovery");
            self.schedule_recovery(home, scheduler);
        }
    }

    /// Daily activation trigger.
    pub fn on_daily_activation(&mut self, home: &impl Home) {
        if home.is_on(&Flag::Vacation) {
            tracing::info!("vacation active, not enabling night mode");
            return;
        }
        if home.is_on(&Flag::NightMode) {
            tracing::debug!("night mode already on");
            return;
        }
        switch_on(home, &Flag::NightMode);
    }

    pub fn on_night_mode_changed(
        &mut self,
        home: &impl Home,
        scheduler: &impl Scheduler,
        enabled: bool,
    ) {
        if !enabled {
            if self.recovery.clear() {
                tracing::info!("night mode cleared, recovery cancelled");
            }
            self.recover_at = None;
            self.phase = NightPhase::Idle;
            return;
        }
        if home.is_on(&Flag::Vacation) {
            tracing::info!("vacation active, skipping night setback");
            return;
        }
        if self.apply_setback(home) {
            self.schedule_recovery(home, scheduler);
        }
    }

    /// Re-plan recovery when one of the tracked alarm sensors changes.
    pub fn on_alarm_changed(&mut self, home: &impl Home, scheduler: &impl Scheduler, sensor: &str) {
        if !self.settings.tracks_alarm(sensor) {
            return;
        }
        if !home.is_on(&Flag::NightMode) || home.is_on(&Flag::Vacation) {
            return;
        }
        tracing::debug!(sensor, "alarm changed, re-planning recovery");
        self.schedule_recovery(home, scheduler);
    }

    pub fn on_timer_fired(&mut self, home: &impl Home, token: TimerToken) {
        if !self.recovery.claim(token) {
            tracing::debug!(%token, "ignoring stale recovery timer");
            return;
        }
        self.recover_at = None;
        if !home.is_on(&Flag::NightMode) {
            tracing::info!("night mode off at recovery time, not restoring");
            self.phase = NightPhase::Idle;
            return;
        }
        self.recover(home);
    }

    /// Force the night to end: bedtime flags and night mode off, any
    /// pending recovery dropped.
    pub fn on_failsafe(&mut self, home: &impl Home) {
        for flag in self.settings.bedtime() {
            if home.is_on(&flag) {
                switch_off(home, &flag);
            }
        }
        if home.is_on(&Flag::NightMode) {
            tracing::info!("fail-safe turning night mode off");
            switch_off(home, &Flag::NightMode);
        }
        if self.recovery.clear() {
            tracing::info!("fail-safe cancelled pending recovery");
        }
        self.recover_at = None;
        self.phase = NightPhase::Idle;
    }

    /// Dispose the recovery timer.
    pub fn shutdown(&mut self) {
        self.recovery.clear();
        self.recover_at = None;
    }

    #[must_use]
    pub fn phase(&self) -> NightPhase {
        self.phase
    }

    /// Token of the armed recovery timer.
    #[must_use]
    pub fn recovery_token(&self) -> Option<TimerToken> {
        self.recovery.token()
    }

    #[must_use]
    pub fn is_recovery_scheduled(&self) -> bool {
        self.recovery.is_armed()
    }

    /// When the armed recovery is due.
    #[must_use]
    pub fn recover_at(&self) -> Option<WallClock> {
        self.recover_at
    }

    fn apply_setback(&mut self, home: &impl Home) -> bool {
        let mode = home.state().operating_mode();
        let Some(target) = self.limits.night_setback_for(mode) else {
            tracing::debug!(?mode, "unsupported hvac mode, skipping night setback");
            return false;
        };
        self.gate.clear();
        write_setpoint(home, &mut self.gate, target, NAME);
        self.phase = NightPhase::SetbackApplied;
        true
    }

    fn schedule_recovery(&mut self, home: &impl Home, scheduler: &impl Scheduler) {
        self.recovery.clear();
        self.recover_at = None;

        let mode = home.state().operating_mode();
        let Some(target) = self.limits.default_for(mode) else {
            tracing::debug!(?mode, "unsupported hvac mode, not planning recovery");
            return;
        };
        let now = scheduler.now();
        let alarms: Vec<WallClock> = self
            .settings
            .alarm_sensors
            .iter()
            .filter_map(|sensor| home.next_alarm(sensor))
            .filter_map(|state| parse_alarm(&state))
            .collect();
        let plan = self
            .settings
            .recovery
            .plan(now, alarms, home.outside_temperature(), target);

        if plan.is_due(now) {
            tracing::info!(wake_at = %plan.wake_at, "recovery already due, recovering now");
            self.recover(home);
            return;
        }
        tracing::info!(
            wake_at = %plan.wake_at,
            source = ?plan.source,
            lead_minutes = plan.lead_minutes,
            recover_at = %plan.recover_at,
            "recovery scheduled"
        );
        self.recovery
            .replace(scheduler.schedule_at(plan.recover_at, TimerKind::NightRecovery));
        self.recover_at = Some(plan.recover_at);
        self.phase = NightPhase::RecoveryScheduled;
    }

    fn recover(&mut self, home: &impl Home) {
        let mode = home.state().operating_mode();
        match self.limits.default_for(mode) {
            Some(target) => {
                write_setpoint(home, &mut self.gate, target, NAME);
            }
            None => tracing::debug!(?mode, "unsupported hvac mode at recovery, skipping"),
        }
        self.phase = NightPhase::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::FlagStore;
    use crate::testing::{FakeHome, FakeScheduler, jan};

    const PRIMARY: &str = "sensor.primary_next_alarm";
    const SECONDARY: &str = "sensor.secondary_next_alarm";

    fn controller() -> NightSetbackController {
        NightSetbackController::new(SetpointLimits::default(), NightSettings::default())
    }

    fn night_home() -> FakeHome {
        let home = FakeHome::heating();
        home.set_flag(Flag::NightMode, true);
        home
    }

    #[test]
    fn should_turn_night_mode_on_at_activation() {
        let home = FakeHome::heating();
        let mut night = controller();
        night.on_daily_activation(&home);
        assert_eq!(home.flag_commands(), vec![(Flag::NightMode, true)]);
    }

    #[test]
    fn should_not_activate_during_vacation() {
        let home = FakeHome::heating();
        home.set_flag(Flag::Vacation, true);
        let mut night = controller();
        night.on_daily_activation(&home);
        assert!(home.flag_commands().is_empty());
    }

    #[test]
    fn should_apply_setback_and_schedule_recovery_from_earliest_alarm() {
        let home = night_home();
        home.set_alarm(PRIMARY, "2026-01-15T07:15:00");
        home.set_alarm(SECONDARY, "2026-01-15T06:30:00");
        home.set_outside(Some(20.0));
        let scheduler = FakeScheduler::at(jan(14, 23, 0));
        let mut night = controller();

        night.on_night_mode_changed(&home, &scheduler, true);

        assert_eq!(home.temperature_writes(), vec![64.0]);
        assert_eq!(night.phase(), NightPhase::RecoveryScheduled);
        // 15 + 1.5 * |20 - 68| = 87 minutes before 06:30
        assert_eq!(night.recover_at(), Some(jan(15, 5, 3)));
        let pending = scheduler.pending_of(TimerKind::NightRecovery);
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].at, jan(15, 5, 3));
    }

    #[test]
    fn should_cap_lead_time_at_ninety_minutes() {
        let home = night_home();
        home.set_alarm(PRIMARY, "2026-01-15T06:30:00");
        home.set_outside(Some(10.0));
        let scheduler = FakeScheduler::at(jan(14, 23, 0));
        let mut night = controller();
        night.on_night_mode_changed(&home, &scheduler, true);
        assert_eq!(night.recover_at(), Some(jan(15, 5, 0)));
    }

    #[test]
    fn should_use_cooling_extremes() {
        let home = FakeHome::cooling();
        home.set_flag(Flag::NightMode, true);
        let scheduler = FakeScheduler::at(jan(14, 23, 0));
        let mut night = controller();
        night.on_night_mode_changed(&home, &scheduler, true);
        assert_eq!(home.temperature_writes(), vec![76.0]);
    }

    #[test]
    fn should_fall_back_to_eight_without_alarms() {
        let home = night_home();
        home.set_alarm(PRIMARY, "unavailable");
        let scheduler = FakeScheduler::at(jan(15, 0, 0));
        let mut night = controller();
        night.on_night_mode_changed(&home, &scheduler, true);
        // base 15 minutes without an outside reading
        assert_eq!(night.recover_at(), Some(jan(15, 7, 45)));
    }

    #[test]
    fn should_skip_night_setback_during_vacation() {
        let home = night_home();
        home.set_flag(Flag::Vacation, true);
        let scheduler = FakeScheduler::at(jan(15, 0, 0));
        let mut night = controller();
        night.on_night_mode_changed(&home, &scheduler, true);
        assert!(home.temperature_writes().is_empty());
        assert!(scheduler.pending().is_empty());
    }

    #[test]
    fn should_skip_unsupported_hvac_mode() {
        let home = FakeHome::with_mode("off");
        home.set_flag(Flag::NightMode, true);
        let scheduler = FakeScheduler::at(jan(15, 0, 0));
        let mut night = controller();
        night.on_night_mode_changed(&home, &scheduler, true);
        assert!(home.temperature_writes().is_empty());
        assert!(scheduler.pending().is_empty());
        assert_eq!(night.phase(), NightPhase::Idle);
    }

    #[test]
    fn should_restore_when_recovery_fires() {
        let home = night_home();
        let scheduler = FakeScheduler::at(jan(15, 0, 0));
        let mut night = controller();
        night.on_night_mode_changed(&home, &scheduler, true);
        let token = night.recovery_token().unwrap();

        scheduler.take(token);
        night.on_timer_fired(&home, token);

        assert_eq!(home.temperature_writes(), vec![64.0, 68.0]);
        assert_eq!(night.phase(), NightPhase::Idle);
        assert!(!night.is_recovery_scheduled());
    }

    #[test]
    fn should_restore_nothing_when_night_mode_cleared_before_recovery() {
        let home = night_home();
        let scheduler = FakeScheduler::at(jan(15, 0, 0));
        let mut night = controller();
        night.on_night_mode_changed(&home, &scheduler, true);
        let token = night.recovery_token().unwrap();

        home.set_flag(Flag::NightMode, false);
        night.on_night_mode_changed(&home, &scheduler, false);

        assert!(scheduler.pending().is_empty());
        assert_eq!(scheduler.cancelled(), vec![token]);
        night.on_timer_fired(&home, token);
        assert_eq!(home.temperature_writes(), vec![64.0]);
    }

    #[test]
    fn should_recheck_night_mode_at_fire_time() {
        let home = night_home();
        let scheduler = FakeScheduler::at(jan(15, 0, 0));
        let mut night = controller();
        night.on_night_mode_changed(&home, &scheduler, true);
        let token = night.recovery_token().unwrap();

        // flag cleared but its change event not yet delivered
        home.set_flag(Flag::NightMode, false);
        night.on_timer_fired(&home, token);

        assert_eq!(home.temperature_writes(), vec![64.0]);
    }

    #[test]
    fn should_reread_hvac_mode_at_fire_time() {
        let home = night_home();
        let scheduler = FakeScheduler::at(jan(15, 0, 0));
        let mut night = controller();
        night.on_night_mode_changed(&home, &scheduler, true);
        let token = night.recovery_token().unwrap();

        home.set_mode("cool");
        night.on_timer_fired(&home, token);

        assert_eq!(home.temperature_writes(), vec![64.0, 73.0]);
    }

    #[test]
    fn should_reschedule_without_stacking_on_alarm_change() {
        let home = night_home();
        home.set_alarm(PRIMARY, "2026-01-15T07:00:00");
        let scheduler = FakeScheduler::at(jan(15, 0, 0));
        let mut night = controller();
        night.on_night_mode_changed(&home, &scheduler, true);
        let first = night.recovery_token().unwrap();

        home.set_alarm(SECONDARY, "2026-01-15T06:00:00");
        night.on_alarm_changed(&home, &scheduler, SECONDARY);

        let pending = scheduler.pending_of(TimerKind::NightRecovery);
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].at, jan(15, 5, 45));
        assert_eq!(scheduler.cancelled(), vec![first]);

        // the disposed timer firing late is ignored
        night.on_timer_fired(&home, first);
        assert_eq!(home.temperature_writes(), vec![64.0]);
        assert!(night.is_recovery_scheduled());
    }

    #[test]
    fn should_ignore_untracked_alarm_sensor() {
        let home = night_home();
        let scheduler = FakeScheduler::at(jan(15, 0, 0));
        let mut night = controller();
        night.on_alarm_changed(&home, &scheduler, "sensor.kitchen_timer");
        assert!(scheduler.pending().is_empty());
    }

    #[test]
    fn should_ignore_alarm_change_when_night_mode_off() {
        let home = FakeHome::heating();
        let scheduler = FakeScheduler::at(jan(15, 0, 0));
        let mut night = controller();
        night.on_alarm_changed(&home, &scheduler, PRIMARY);
        assert!(scheduler.pending().is_empty());
    }

    #[test]
    fn should_recover_immediately_when_plan_is_overdue() {
        let home = night_home();
        home.set_alarm(PRIMARY, "2026-01-15T06:30:00");
        let scheduler = FakeScheduler::at(jan(15, 0, 0));
        let mut night = controller();
        night.on_night_mode_changed(&home, &scheduler, true);

        scheduler.set_now(jan(15, 6, 20));
        night.on_alarm_changed(&home, &scheduler, PRIMARY);

        assert_eq!(home.temperature_writes(), vec![64.0, 68.0]);
        assert!(scheduler.pending().is_empty());
        assert_eq!(night.phase(), NightPhase::Idle);
    }

    #[test]
    fn should_clear_flags_and_cancel_recovery_on_failsafe() {
        let home = night_home();
        home.set_flag(Flag::Bedtime("primary_bed".to_string()), true);
        home.set_flag(Flag::Bedtime("basement_bed".to_string()), true);
        let scheduler = FakeScheduler::at(jan(15, 0, 0));
        let mut night = controller();
        night.on_night_mode_changed(&home, &scheduler, true);

        night.on_failsafe(&home);

        assert!(!home.is_on(&Flag::NightMode));
        assert!(!home.is_on(&Flag::Bedtime("primary_bed".to_string())));
        assert!(!home.is_on(&Flag::Bedtime("basement_bed".to_string())));
        assert!(
            !home
                .flag_commands()
                .contains(&(Flag::Bedtime("secondary_bed".to_string()), false))
        );
        assert!(scheduler.pending().is_empty());
        assert_eq!(night.phase(), NightPhase::Idle);
    }

    #[test]
    fn should_plan_recovery_without_setback_on_startup() {
        let home = night_home();
        let scheduler = FakeScheduler::at(jan(15, 3, 0));
        let mut night = controller();
        night.start(&home, &scheduler);
        assert!(home.temperature_writes().is_empty());
        assert!(night.is_recovery_scheduled());
    }

    #[test]
    fn should_write_setback_again_on_the_next_night() {
        let home = night_home();
        let scheduler = FakeScheduler::at(jan(15, 0, 0));
        let mut night = controller();
        night.on_night_mode_changed(&home, &scheduler, true);
        let token = night.recovery_token().unwrap();
        night.on_timer_fired(&home, token);

        // someone turned the thermostat up and the flag cycles the next night
        night.on_night_mode_changed(&home, &scheduler, false);
        scheduler.set_now(jan(16, 0, 0));
        night.on_night_mode_changed(&home, &scheduler, true);

        assert_eq!(home.temperature_writes(), vec![64.0, 68.0, 64.0]);
    }
}
