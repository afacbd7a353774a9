//! Board-level settings around the control path
//!
//! Sampling rate, PWM resolution, watchdog period and serial telemetry.
//! These sit next to [`ControlConfig`] in kinesis.toml but are consumed by
//! the firmware, not by the control loop.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{ConfigError, ControlConfig};

/// What the firmware streams between state changes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TelemetryMode {
    /// `State=... Amp=... DC=... PWM=...` lines while Active
    #[default]
    Status,
    /// One bare amplitude per line, for host visualisers
    Loudness,
    /// State changes and faults only
    Off,
}

/// Everything read from the sculpture's configuration file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BoardConfig {
    pub control: ControlConfig,
    pub sample_rate_hz: u32,
    /// PWM counter top; the duty resolution is `pwm_top + 1` steps
    pub pwm_top: u16,
    pub watchdog_timeout_ms: u32,
    pub telemetry: TelemetryMode,
    pub telemetry_interval_ms: u32,
    pub baud_rate: u32,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            control: ControlConfig::default(),
            sample_rate_hz: 1000,
            pwm_top: 4095,
            watchdog_timeout_ms: 8000,
            telemetry: TelemetryMode::Status,
            telemetry_interval_ms: 100,
            baud_rate: 9600,
        }
    }
}

impl BoardConfig {
    /// Replace an inconsistent control configuration with the defaults
    ///
    /// Returns the validation error that caused the fallback, if any. A
    /// zero telemetry interval is raised to 1 ms.
    pub fn repair(&mut self) -> Option<ConfigError> {
        self.telemetry_interval_ms = self.telemetry_interval_ms.max(1);

        match self.control.validate() {
            Ok(()) => None,
            Err(e) => {
                self.control = ControlConfig::default();
                Some(e)
            }
        }
    }
}
