//! Climate runtime: feeds events to the controllers one at a time.
//!
//! The runtime owns the mode engine and every controller. Events arrive on
//! an unbounded tokio mpsc channel (state changes from the platform adapter,
//! expiries from the scheduler) and each one is handled to completion
//! before the next is read, so controllers never run concurrently.

use climatehub_domain::event::{ClimateEvent, DailyTrigger, TimerKind};
use climatehub_domain::flag::Flag;
use climatehub_domain::mode::{ModeTransition, OccupancyMode};
use climatehub_domain::settings::ClimateSettings;
use tokio::sync::mpsc;

use crate::controllers::{
    AwaySetbackController, CirculatorController, NightSetbackController,
    VacationSetbackController,
};
use crate::exclusion::ModeFlagExclusion;
use crate::mode_engine::{OccupancyModeEngine, read_inputs};
use crate::ports::{Home, Scheduler, TimerHandle};

/// How many mode transitions a slow subscriber may fall behind.
const MODE_CHANNEL_CAPACITY: usize = 16;

pub struct ClimateRuntime<H, S> {
    home: H,
    scheduler: S,
    settings: ClimateSettings,
    engine: OccupancyModeEngine,
    away: AwaySetbackController,
    vacation: VacationSetbackController,
    night: NightSetbackController,
    circulator: CirculatorController,
    daily: Vec<TimerHandle>,
}

impl<H, S> ClimateRuntime<H, S>
where
    H: Home,
    S: Scheduler,
{
    /// Build the runtime. The occupancy mode is evaluated immediately;
    /// nothing is written or scheduled until [`start`](Self::start).
    pub fn new(home: H, scheduler: S, settings: ClimateSettings) -> Self {
        let engine = OccupancyModeEngine::new(&read_inputs(&home), MODE_CHANNEL_CAPACITY);
        Self {
            away: AwaySetbackController::new(settings.setpoints, settings.away),
            vacation: VacationSetbackController::new(settings.setpoints, settings.vacation),
            night: NightSetbackController::new(settings.setpoints, settings.night.clone()),
            circulator: CirculatorController::new(settings.circulator),
            home,
            scheduler,
            settings,
            engine,
            daily: Vec::new(),
        }
    }

    /// Arm the daily triggers and let every controller catch up with the
    /// state already in effect.
    pub fn start(&mut self) {
        for handle in self.daily.drain(..) {
            handle.dispose();
        }
        self.daily.push(
            self.scheduler
                .schedule_daily(self.settings.night.activation_time, DailyTrigger::NightActivation),
        );
        self.daily.push(
            self.scheduler
                .schedule_daily(self.settings.night.failsafe_time, DailyTrigger::NightFailsafe),
        );

        let mode = self.engine.current();
        tracing::info!(%mode, "climate runtime starting");
        self.away.start(&self.home, mode);
        self.vacation.start(&self.home, mode);
        self.night.start(&self.home, &self.scheduler);
        self.circulator.start(&self.home, &self.scheduler);
    }

    /// Handle one event to completion.
    pub fn handle(&mut self, event: ClimateEvent) {
        tracing::trace!(?event, "handling event");
        match event {
            ClimateEvent::ZoneOccupantsChanged { .. } => self.reevaluate_mode(),
            ClimateEvent::FlagChanged { flag, old, new } => self.on_flag_changed(&flag, old, new),
            ClimateEvent::DistanceChanged { old, new } => {
                let mode = self.engine.current();
                self.away.on_distance_changed(&self.home, mode, new);
                self.vacation.on_distance_changed(&self.home, mode, old, new);
            }
            ClimateEvent::OutsideTemperatureChanged { .. } => {
                // read on demand when recovery is planned
            }
            ClimateEvent::AlarmChanged { sensor, .. } => {
                self.night.on_alarm_changed(&self.home, &self.scheduler, &sensor);
            }
            ClimateEvent::ThermostatChanged { old, new } => {
                self.circulator
                    .on_thermostat_changed(&self.home, &self.scheduler, &old, &new);
            }
            ClimateEvent::Daily(DailyTrigger::NightActivation) => {
                self.night.on_daily_activation(&self.home);
            }
            ClimateEvent::Daily(DailyTrigger::NightFailsafe) => self.night.on_failsafe(&self.home),
            ClimateEvent::TimerFired {
                kind: TimerKind::NightRecovery,
                token,
            } => self.night.on_timer_fired(&self.home, token),
            ClimateEvent::TimerFired {
                kind: TimerKind::Circulator,
                token,
            } => self
                .circulator
                .on_timer_fired(&self.home, &self.scheduler, token),
        }
    }

    /// Start, then handle events until every sender is dropped.
    pub async fn run(mut self, mut events: mpsc::UnboundedReceiver<ClimateEvent>) {
        self.start();
        while let Some(event) = events.recv().await {
            self.handle(event);
        }
        tracing::info!("event channel closed, climate runtime stopping");
        self.shutdown();
    }

    /// Dispose every timer the runtime or its controllers hold.
    pub fn shutdown(&mut self) {
        for handle in self.daily.drain(..) {
            handle.dispose();
        }
        self.night.shutdown();
        self.circulator.shutdown();
    }

    /// Current occupancy mode.
    #[must_use]
    pub fn mode(&self) -> OccupancyMode {
        self.engine.current()
    }

    #[must_use]
    pub fn engine(&self) -> &OccupancyModeEngine {
        &self.engine
    }

    #[must_use]
    pub fn home(&self) -> &H {
        &self.home
    }

    #[must_use]
    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    #[must_use]
    pub fn away(&self) -> &AwaySetbackController {
        &self.away
    }

    #[must_use]
    pub fn vacation(&self) -> &VacationSetbackController {
        &self.vacation
    }

    #[must_use]
    pub fn night(&self) -> &NightSetbackController {
        &self.night
    }

    #[must_use]
    pub fn circulator(&self) -> &CirculatorController {
        &self.circulator
    }

    fn on_flag_changed(&mut self, flag: &Flag, old: bool, new: bool) {
        if old == new {
            return;
        }
        ModeFlagExclusion::on_flag_changed(&self.home, flag, old, new);
        if flag.affects_occupancy() {
            self.reevaluate_mode();
            return;
        }
        match flag {
            Flag::NightMode => self
                .night
                .on_night_mode_changed(&self.home, &self.scheduler, new),
            Flag::Circulator => self
                .circulator
                .on_enabled_changed(&self.home, &self.scheduler, new),
            Flag::Vacation | Flag::Guest | Flag::Bedtime(_) => {}
        }
    }

    fn reevaluate_mode(&mut self) {
        let inputs = read_inputs(&self.home);
        if let Some(transition) = self.engine.reevaluate(&inputs) {
            self.on_mode_changed(transition);
        }
    }

    fn on_mode_changed(&mut self, transition: ModeTransition) {
        self.away.on_mode_changed(&self.home, transition);
        self.vacation.on_mode_changed(&self.home, transition);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controllers::{CirculatorPhase, NightPhase};
    use crate::ports::{FlagStore, Thermostat};
    use crate::testing::{FakeHome, FakeScheduler, jan};
    use climatehub_domain::hvac::{FanMode, HvacAction};
    use climatehub_domain::time::{WallClock, hour_minute};
    use std::sync::Arc;

    fn runtime(home: &Arc<FakeHome>, now: WallClock) -> ClimateRuntime<Arc<FakeHome>, FakeScheduler> {
        ClimateRuntime::new(
            Arc::clone(home),
            FakeScheduler::at(now),
            ClimateSettings::default(),
        )
    }

    fn flag(flag: Flag, old: bool, new: bool) -> ClimateEvent {
        ClimateEvent::FlagChanged { flag, old, new }
    }

    #[test]
    fn should_arm_daily_triggers_on_start() {
        let home = Arc::new(FakeHome::heating());
        let mut rt = runtime(&home, jan(14, 20, 0));
        rt.start();
        assert_eq!(
            rt.scheduler().daily(),
            vec![
                (hour_minute(0, 0), DailyTrigger::NightActivation),
                (hour_minute(10, 0), DailyTrigger::NightFailsafe),
            ]
        );
        rt.shutdown();
        assert!(rt.scheduler().daily().is_empty());
    }

    #[test]
    fn should_catch_up_with_away_at_startup() {
        let home = Arc::new(FakeHome::heating());
        home.set_distance(Some(30.0));
        let mut rt = runtime(&home, jan(14, 20, 0));
        assert_eq!(rt.mode(), OccupancyMode::Away);
        rt.start();
        assert_eq!(home.temperature_writes(), vec![64.0]);
    }

    #[test]
    fn should_route_zone_changes_through_mode_engine() {
        let home = Arc::new(FakeHome::heating());
        home.set_zone("2");
        let mut rt = runtime(&home, jan(14, 20, 0));
        rt.start();
        let mut changes = rt.engine().subscribe();

        home.set_zone("0");
        home.set_distance(Some(15.0));
        rt.handle(ClimateEvent::ZoneOccupantsChanged {
            old: Some("2".to_string()),
            new: Some("0".to_string()),
        });

        assert_eq!(rt.mode(), OccupancyMode::Away);
        assert_eq!(changes.try_recv().unwrap().to, OccupancyMode::Away);
        assert_eq!(home.temperature_writes(), vec![66.0]);

        home.set_zone("1");
        rt.handle(ClimateEvent::ZoneOccupantsChanged {
            old: Some("0".to_string()),
            new: Some("1".to_string()),
        });
        assert_eq!(home.temperature_writes(), vec![66.0, 68.0]);
    }

    #[test]
    fn should_route_distance_to_away_and_vacation() {
        let home = Arc::new(FakeHome::heating());
        home.set_flag(Flag::Vacation, true);
        let mut rt = runtime(&home, jan(14, 20, 0));
        rt.start();
        rt.handle(ClimateEvent::DistanceChanged {
            old: Some(120.0),
            new: Some(50.0),
        });
        assert!(rt.vacation().pre_arrival_done());
        assert_eq!(home.temperature_writes(), vec![60.0, 68.0]);
    }

    #[test]
    fn should_hand_vacation_over_to_away() {
        let home = Arc::new(FakeHome::heating());
        home.set_flag(Flag::Vacation, true);
        home.set_distance(Some(30.0));
        let mut rt = runtime(&home, jan(14, 20, 0));
        rt.start();

        home.set_flag(Flag::Vacation, false);
        rt.handle(flag(Flag::Vacation, true, false));

        assert_eq!(rt.mode(), OccupancyMode::Away);
        assert_eq!(home.temperature_writes(), vec![60.0, 64.0]);
    }

    #[test]
    fn should_enforce_flag_exclusion_before_reevaluating() {
        let home = Arc::new(FakeHome::heating());
        home.set_flag(Flag::Guest, true);
        let mut rt = runtime(&home, jan(14, 20, 0));
        rt.start();
        assert_eq!(rt.mode(), OccupancyMode::Guest);

        home.set_flag(Flag::Vacation, true);
        rt.handle(flag(Flag::Vacation, false, true));

        assert!(!home.is_on(&Flag::Guest));
        assert_eq!(rt.mode(), OccupancyMode::Vacation);
    }

    #[test]
    fn should_run_a_full_night_cycle() {
        let home = Arc::new(FakeHome::heating());
        home.set_zone("2");
        home.set_alarm("sensor.primary_next_alarm", "2026-01-15T06:30:00");
        let mut rt = runtime(&home, jan(15, 0, 0));
        rt.start();

        rt.handle(ClimateEvent::Daily(DailyTrigger::NightActivation));
        assert_eq!(home.flag_commands(), vec![(Flag::NightMode, true)]);
        rt.handle(flag(Flag::NightMode, false, true));
        assert_eq!(rt.night().phase(), NightPhase::RecoveryScheduled);

        let token = rt.night().recovery_token().unwrap();
        rt.scheduler().take(token);
        rt.handle(ClimateEvent::TimerFired {
            kind: TimerKind::NightRecovery,
            token,
        });
        assert_eq!(home.temperature_writes(), vec![64.0, 68.0]);

        rt.handle(ClimateEvent::Daily(DailyTrigger::NightFailsafe));
        assert!(!home.is_on(&Flag::NightMode));
    }

    #[test]
    fn should_drive_circulator_from_thermostat_events() {
        let home = Arc::new(FakeHome::heating());
        home.set_zone("1");
        home.set_flag(Flag::Circulator, true);
        let mut rt = runtime(&home, jan(15, 12, 0));
        rt.start();
        assert_eq!(rt.circulator().phase(), CirculatorPhase::Cycling(FanMode::On));

        let old = home.state();
        home.set_action(Some(HvacAction::Heating));
        rt.handle(ClimateEvent::ThermostatChanged {
            old,
            new: home.state(),
        });
        assert_eq!(rt.circulator().phase(), CirculatorPhase::Idle);
        assert_eq!(home.fan_writes(), vec![FanMode::On, FanMode::Auto]);
    }

    #[test]
    fn should_not_reevaluate_mode_for_bedtime_flags() {
        let home = Arc::new(FakeHome::heating());
        home.set_zone("1");
        let mut rt = runtime(&home, jan(15, 12, 0));
        rt.start();

        home.set_zone("0");
        home.set_distance(Some(15.0));
        rt.handle(flag(Flag::Bedtime("guest_bed".to_string()), false, true));
        assert_eq!(rt.mode(), OccupancyMode::Home);
        assert!(home.temperature_writes().is_empty());

        rt.handle(flag(Flag::Guest, true, false));
        assert_eq!(rt.mode(), OccupancyMode::Away);
    }

    #[test]
    fn should_ignore_repeated_flag_state() {
        let home = Arc::new(FakeHome::heating());
        home.set_zone("1");
        let mut rt = runtime(&home, jan(15, 12, 0));
        rt.start();
        rt.handle(flag(Flag::Circulator, false, false));
        assert_eq!(rt.circulator().phase(), CirculatorPhase::Idle);
        assert!(home.fan_writes().is_empty());
    }

    #[tokio::test]
    async fn should_process_events_until_channel_closes() {
        let home = Arc::new(FakeHome::heating());
        home.set_zone("1");
        let rt = runtime(&home, jan(15, 12, 0));
        let (tx, rx) = mpsc::unbounded_channel();

        home.set_flag(Flag::Circulator, true);
        tx.send(flag(Flag::Circulator, false, true)).unwrap();
        drop(tx);
        rt.run(rx).await;

        // start cycled once from the flag already on, the event restarted it
        assert_eq!(home.fan_writes(), vec![FanMode::On]);
        assert!(home.is_on(&Flag::Circulator));
    }
}
