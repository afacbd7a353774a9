//! Control configuration type definitions
//!
//! Every tunable of the control path lives here. The only exception is the
//! rolling buffer length, which is a const generic on the sample ring and
//! the extractor so the buffer can live in a `static` without allocation.

use crate::motion::SlewLimiter;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Reference rolling buffer length (samples)
pub const DEFAULT_BUFFER_SIZE: usize = 20;

/// Configuration validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Exit threshold must be strictly below the enter threshold
    ThresholdOrder,
    /// Maximum amplitude must be above the exit threshold
    AmplitudeRange,
    /// Silence baseline is outside the ADC range
    BaselineOutOfRange,
    /// Minimum drive above maximum drive, or maximum above hardware limit
    DriveRange,
    /// Slew step of zero would freeze the motor
    ZeroSlewStep,
    /// Motor update interval must be at least 1 ms
    ZeroUpdateInterval,
}

/// Tunables for the amplitude extractor, motion mapper and supervisor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ControlConfig {
    /// ADC reading at silence (DC offset of the microphone bias)
    pub silence_baseline: u16,
    /// Largest raw ADC reading
    pub adc_max: u16,
    /// Amplitude that must be held to leave Idle
    pub active_enter_threshold: u16,
    /// Amplitude at or below which the signal counts as silence
    pub active_exit_threshold: u16,
    /// Amplitude mapped to maximum drive
    pub max_amplitude: u16,
    /// Time the enter threshold must be held continuously (ms)
    pub enter_debounce_ms: u32,
    /// Silence needed before Active may return to Idle (ms)
    pub idle_timeout_ms: u32,
    /// Sample counter may not stand still longer than this (ms)
    pub stall_timeout_ms: u32,
    /// Time after entering Idle during which Active entry is suppressed (ms)
    pub calibration_warmup_ms: u32,
    /// Largest drive change per motor update
    pub slew_step: u16,
    /// Lowest non-zero drive (motor stalls below this)
    pub min_drive: u16,
    /// Drive at maximum amplitude
    pub max_drive: u16,
    /// Hardware PWM ceiling
    pub max_drive_hw: u16,
    /// Cadence of drive updates while Active (ms)
    pub motor_update_interval_ms: u32,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            silence_baseline: 512,
            adc_max: 1023,
            active_enter_threshold: 15,
            active_exit_threshold: 8,
            max_amplitude: 512,
            enter_debounce_ms: 50,
            idle_timeout_ms: 2000,
            stall_timeout_ms: 250,
            calibration_warmup_ms: 500,
            slew_step: 8,
            min_drive: 80,
            max_drive: 255,
            max_drive_hw: 255,
            motor_update_interval_ms: 10,
        }
    }
}

impl ControlConfig {
    /// Check internal consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.active_exit_threshold >= self.active_enter_threshold {
            return Err(ConfigError::ThresholdOrder);
        }
        if self.max_amplitude <= self.active_exit_threshold {
            return Err(ConfigError::AmplitudeRange);
        }
        if self.silence_baseline > self.adc_max {
            return Err(ConfigError::BaselineOutOfRange);
        }
        if self.min_drive > self.max_drive || self.max_drive > self.max_drive_hw {
            return Err(ConfigError::DriveRange);
        }
        if self.slew_step == 0 {
            return Err(ConfigError::ZeroSlewStep);
        }
        if self.motor_update_interval_ms == 0 {
            return Err(ConfigError::ZeroUpdateInterval);
        }
        Ok(())
    }

    /// Worst-case time to slew from maximum drive down to zero (ms)
    pub fn slew_drain_ms(&self) -> u32 {
        let steps = SlewLimiter::new(self.slew_step).updates_to_reach(self.max_drive, 0);
        steps * self.motor_update_interval_ms
    }
}
