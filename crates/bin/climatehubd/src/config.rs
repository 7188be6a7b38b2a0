//! Configuration loading: TOML file with environment variable overrides.
//!
//! Looks for `climatehub.toml` in the working directory, or the path in
//! `CLIMATEHUB_CONFIG`. Every field has a sensible default so the file is
//! optional. Environment variables take precedence over file values.

use climatehub_adapter_virtual::VirtualHomeState;
use climatehub_domain::error::ValidationError;
use climatehub_domain::flag::Flag;
use climatehub_domain::hvac::{HvacAction, ThermostatState};
use climatehub_domain::recovery::RecoverySettings;
use climatehub_domain::settings::{
    AwaySettings, CirculatorSettings, ClimateSettings, NightSettings, VacationSettings,
};
use climatehub_domain::setpoint::SetpointLimits;
use serde::Deserialize;

const DEFAULT_PATH: &str = "climatehub.toml";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Comfort and setback temperatures.
    pub setpoints: SetpointLimits,
    pub away: AwaySettings,
    pub vacation: VacationSettings,
    /// Night setback, including `[night.recovery]`.
    pub night: NightSettings,
    pub circulator: CirculatorSettings,
    /// Starting state of the simulated house.
    pub simulation: SimulationConfig,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// Initial readings of the virtual house.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Thermostat operating mode (`heat`, `cool`, `off`, ...).
    pub hvac_mode: String,
    /// Thermostat `hvac_action` (`idle`, `heating`, `none`, ...).
    pub hvac_action: String,
    /// Raw occupant count of the home zone.
    pub zone_occupants: String,
    pub distance_miles: Option<f64>,
    pub outside_temperature: Option<f64>,
    pub vacation: bool,
    pub guest: bool,
    pub night_mode: bool,
    pub circulator: bool,
}

impl Config {
    /// Load configuration from `climatehub.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting settings are invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("CLIMATEHUB_CONFIG").unwrap_or_else(|_| DEFAULT_PATH.to_string());
        let mut config = Self::from_file(&path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("CLIMATEHUB_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.climate_settings().validate()?;
        if let Some(distance) = self.simulation.distance_miles {
            if !distance.is_finite() || distance < 0.0 {
                return Err(ConfigError::Validation(
                    "simulation.distance_miles must be a non-negative number".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// The climate tunables, assembled from their sections.
    #[must_use]
    pub fn climate_settings(&self) -> ClimateSettings {
        ClimateSettings {
            setpoints: self.setpoints,
            away: self.away,
            vacation: self.vacation,
            night: self.night.clone(),
            circulator: self.circulator,
        }
    }

    /// Night recovery settings, shorthand for logging at startup.
    #[must_use]
    pub fn recovery(&self) -> &RecoverySettings {
        &self.night.recovery
    }
}

impl SimulationConfig {
    /// Starting state for the virtual home.
    #[must_use]
    pub fn home_state(&self) -> VirtualHomeState {
        let flags = [
            (self.vacation, Flag::Vacation),
            (self.guest, Flag::Guest),
            (self.night_mode, Flag::NightMode),
            (self.circulator, Flag::Circulator),
        ]
        .into_iter()
        .filter_map(|(on, flag)| on.then_some(flag))
        .collect();

        VirtualHomeState {
            thermostat: ThermostatState {
                mode: self.hvac_mode.clone(),
                action: HvacAction::parse(&self.hvac_action),
                ..ThermostatState::default()
            },
            zone_occupants: Some(self.zone_occupants.clone()),
            distance: self.distance_miles,
            outside_temperature: self.outside_temperature,
            flags,
            ..VirtualHomeState::default()
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "climatehubd=info,climatehub=info".to_string(),
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            hvac_mode: "heat".to_string(),
            hvac_action: "idle".to_string(),
            zone_occupants: "1".to_string(),
            distance_miles: Some(0.0),
            outside_temperature: None,
            vacation: false,
            guest: false,
            night_mode: false,
            circulator: false,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Climate tunables violate a domain invariant.
    #[error("invalid climate settings: {0}")]
    Settings(#[from] ValidationError),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
