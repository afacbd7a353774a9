//! Firmware configuration
//!
//! kinesis.toml is compiled into the image and parsed once at boot. A bad
//! key falls back to its default; a control configuration that fails
//! validation as a whole falls back to [`ControlConfig::default`].
//!
//! [`ControlConfig::default`]: kinesis_core::config::ControlConfig

use defmt::*;
use kinesis_core::config::{parse_config, BoardConfig};

/// Longest watchdog period the RP2040 can count (ms)
pub const MAX_WATCHDOG_TIMEOUT_MS: u32 = 8300;

/// Embedded configuration (compiled into firmware)
/// Edit kinesis.toml and rebuild to customize
pub const EMBEDDED_CONFIG: &str = include_str!("../../kinesis.toml");

/// Parse the embedded configuration, logging every fallback
pub fn load() -> BoardConfig {
    let mut config = parse_config(EMBEDDED_CONFIG, |e| {
        warn!(
            "kinesis.toml line {}: {:?}, keeping default",
            e.line, e.error
        );
    });

    if let Some(e) = config.repair() {
        warn!("Control config rejected ({:?}), using defaults", e);
    }

    if config.watchdog_timeout_ms == 0 || config.watchdog_timeout_ms > MAX_WATCHDOG_TIMEOUT_MS {
        warn!(
            "Watchdog timeout {} ms out of range, clamping",
            config.watchdog_timeout_ms
        );
        config.watchdog_timeout_ms = config.watchdog_timeout_ms.clamp(1, MAX_WATCHDOG_TIMEOUT_MS);
    }

    info!(
        "Config: enter={} exit={} drive={}..{} slew={} telemetry={:?}",
        config.control.active_enter_threshold,
        config.control.active_exit_threshold,
        config.control.min_drive,
        config.control.max_drive,
        config.control.slew_step,
        config.telemetry
    );

    config
}
