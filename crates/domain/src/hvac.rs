//! HVAC state as reported by the thermostat entity.

use serde::{Deserialize, Serialize};

/// Operating mode class that decides which setpoint family applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HvacOperatingMode {
    Heat,
    Cool,
    /// Off, fan-only, auto or anything unrecognised. No setpoint is written.
    Other,
}

impl HvacOperatingMode {
    /// Classify a raw operating mode string (`"heat"`, `"cool"`, …).
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "heat" => Self::Heat,
            "cool" => Self::Cool,
            _ => Self::Other,
        }
    }
}

/// What the HVAC equipment is doing right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HvacAction {
    Heating,
    Cooling,
    Idle,
    Off,
    /// Fan-only, drying, defrosting, …
    Other,
}

impl HvacAction {
    /// Parse the thermostat's `hvac_action` attribute.
    ///
    /// Returns `None` for an empty or `none` attribute.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "" | "none" => None,
            "heating" => Some(Self::Heating),
            "cooling" => Some(Self::Cooling),
            "idle" => Some(Self::Idle),
            "off" => Some(Self::Off),
            _ => Some(Self::Other),
        }
    }

    /// Heating or cooling.
    #[must_use]
    pub fn is_active(self) -> bool {
        matches!(self, Self::Heating | Self::Cooling)
    }
}

/// Fan mode of the air handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FanMode {
    Auto,
    On,
}

impl FanMode {
    /// The opposite fan mode.
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Auto => Self::On,
            Self::On => Self::Auto,
        }
    }
}

impl std::fmt::Display for FanMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Auto => f.write_str("auto"),
            Self::On => f.write_str("on"),
        }
    }
}

/// Snapshot of the thermostat entity.
#[derive(Debug, Clone, PartialEq)]
pub struct ThermostatState {
    /// Raw operating mode (`heat`, `cool`, `off`, `fan_only`, …).
    pub mode: String,
    /// Current `hvac_action` attribute.
    pub action: Option<HvacAction>,
    /// Current `fan_mode` attribute.
    pub fan_mode: Option<FanMode>,
    /// Current target temperature.
    pub setpoint: Option<f64>,
}

impl ThermostatState {
    /// Operating mode class for setpoint decisions.
    #[must_use]
    pub fn operating_mode(&self) -> HvacOperatingMode {
        HvacOperatingMode::parse(&self.mode)
    }

    /// Whether the thermostat is switched off entirely.
    #[must_use]
    pub fn is_off(&self) -> bool {
        self.mode.trim() == "off"
    }

    /// Whether equipment is actively heating or cooling.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.action.is_some_and(HvacAction::is_active)
    }

    /// Idle or switched off: the fan is free for circulation.
    #[must_use]
    pub fn is_resting(&self) -> bool {
        matches!(self.action, Some(HvacAction::Idle | HvacAction::Off)) || self.is_off()
    }
}

impl Default for ThermostatState {
    fn default() -> Self {
        Self {
            mode: "off".to_string(),
            action: None,
            fan_mode: Some(FanMode::Auto),
            setpoint: None,
        }
    }
}
