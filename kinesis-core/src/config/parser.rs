//! Line parser for the sculpture's TOML configuration
//!
//! Handles only the flat subset kinesis.toml uses. It does
//! NOT support the full TOML spec.
//!
//! Supported features:
//! - `[section]` headers (no dotted or nested sections)
//! - Key = value pairs (string, integer)
//! - Comments (# ...), including after a value
//!
//! Errors never abort the parse. Each bad line is reported through the
//! callback and the affected key keeps its default.

use core::str::FromStr;

use super::{BoardConfig, TelemetryMode};

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Section header is not one of the known sections
    InvalidSection,
    /// Line is neither a header nor `key = value`
    InvalidLine,
    /// Key is not known in its section
    UnknownKey,
    /// Value has the wrong type or is out of range for its field
    InvalidValue,
}

/// A parse error and the (1-based) line it was found on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LineError {
    pub line: usize,
    pub error: ParseError,
}

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Sampling,
    Thresholds,
    Timing,
    Drive,
    Watchdog,
    Telemetry,
    /// Keys under an unknown header are skipped without further errors
    Unknown,
}

/// Parse kinesis.toml text on top of [`BoardConfig::default`]
pub fn parse_config(input: &str, mut on_error: impl FnMut(LineError)) -> BoardConfig {
    let mut config = BoardConfig::default();
    let mut section = Section::Root;

    for (index, line) in input.lines().enumerate() {
        let line = line.trim();
        let mut report = |error| {
            on_error(LineError {
                line: index + 1,
                error,
            })
        };

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with('[') {
            section = match parse_section_header(line) {
                Ok(section) => section,
                Err(e) => {
                    report(e);
                    Section::Unknown
                }
            };
            continue;
        }

        let Some((key, value)) = parse_key_value(line) else {
            report(ParseError::InvalidLine);
            continue;
        };

        if section == Section::Unknown {
            continue;
        }
        if let Err(e) = apply_value(section, key, value, &mut config) {
            report(e);
        }
    }

    config
}

/// Parse a header line like `[timing]`
fn parse_section_header(line: &str) -> Result<Section, ParseError> {
    let name = line
        .strip_prefix('[')
        .and_then(|rest| strip_comment(rest).trim_end().strip_suffix(']'))
        .ok_or(ParseError::InvalidSection)?;

    match name.trim() {
        "sampling" => Ok(Section::Sampling),
        "thresholds" => Ok(Section::Thresholds),
        "timing" => Ok(Section::Timing),
        "drive" => Ok(Section::Drive),
        "watchdog" => Ok(Section::Watchdog),
        "telemetry" => Ok(Section::Telemetry),
        _ => Err(ParseError::InvalidSection),
    }
}

/// Split `key = value`, dropping any trailing comment
fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    let value = strip_comment(value).trim();
    if key.is_empty() || value.is_empty() {
        return None;
    }
    Some((key, value))
}

/// Cut a `# comment` that is not inside a quoted string
fn strip_comment(text: &str) -> &str {
    let mut in_string = false;
    for (i, c) in text.char_indices() {
        match c {
            '"' => in_string = !in_string,
            '#' if !in_string => return &text[..i],
            _ => {}
        }
    }
    text
}

/// Parse a quoted string value
fn parse_string(value: &str) -> Result<&str, ParseError> {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .ok_or(ParseError::InvalidValue)
}

/// Parse an integer value into the field's type
///
/// Values that do not fit the target type are rejected, not truncated.
fn parse_int<T: FromStr>(value: &str) -> Result<T, ParseError> {
    value.parse::<T>().map_err(|_| ParseError::InvalidValue)
}

fn parse_telemetry_mode(value: &str) -> Result<TelemetryMode, ParseError> {
    match parse_string(value)? {
        "status" => Ok(TelemetryMode::Status),
        "loudness" => Ok(TelemetryMode::Loudness),
        "off" => Ok(TelemetryMode::Off),
        _ => Err(ParseError::InvalidValue),
    }
}

/// Apply a key-value pair to the config
///
/// The field is only written once the value parsed.
fn apply_value(
    section: Section,
    key: &str,
    value: &str,
    config: &mut BoardConfig,
) -> Result<(), ParseError> {
    let control = &mut config.control;

    match (section, key) {
        // Compile-time only, consumed by build.rs
        (Section::Sampling, "buffer_size") => {
            parse_int::<usize>(value)?;
        }
        (Section::Sampling, "sample_rate_hz") => {
            let rate: u32 = parse_int(value)?;
            if rate == 0 {
                return Err(ParseError::InvalidValue);
            }
            config.sample_rate_hz = rate;
        }
        (Section::Sampling, "silence_baseline") => control.silence_baseline = parse_int(value)?,
        (Section::Sampling, "adc_max") => control.adc_max = parse_int(value)?,

        (Section::Thresholds, "active_enter") => control.active_enter_threshold = parse_int(value)?,
        (Section::Thresholds, "active_exit") => control.active_exit_threshold = parse_int(value)?,
        (Section::Thresholds, "max_amplitude") => control.max_amplitude = parse_int(value)?,

        (Section::Timing, "enter_debounce_ms") => control.enter_debounce_ms = parse_int(value)?,
        (Section::Timing, "idle_timeout_ms") => control.idle_timeout_ms = parse_int(value)?,
        (Section::Timing, "stall_timeout_ms") => control.stall_timeout_ms = parse_int(value)?,
        (Section::Timing, "calibration_warmup_ms") => {
            control.calibration_warmup_ms = parse_int(value)?
        }
        (Section::Timing, "motor_update_interval_ms") => {
            control.motor_update_interval_ms = parse_int(value)?
        }

        (Section::Drive, "min") => control.min_drive = parse_int(value)?,
        (Section::Drive, "max") => control.max_drive = parse_int(value)?,
        (Section::Drive, "max_hw") => control.max_drive_hw = parse_int(value)?,
        (Section::Drive, "slew_step") => control.slew_step = parse_int(value)?,
        (Section::Drive, "pwm_top") => {
            let top: u16 = parse_int(value)?;
            // top + 1 counts per period; 0xFFFF would leave no room for 100% duty
            if top == 0 || top == u16::MAX {
                return Err(ParseError::InvalidValue);
            }
            config.pwm_top = top;
        }

        (Section::Watchdog, "timeout_ms") => config.watchdog_timeout_ms = parse_int(value)?,

        (Section::Telemetry, "mode") => config.telemetry = parse_telemetry_mode(value)?,
        (Section::Telemetry, "interval_ms") => config.telemetry_interval_ms = parse_int(value)?,
        (Section::Telemetry, "baud") => config.baud_rate = parse_int(value)?,

        _ => return Err(ParseError::UnknownKey),
    }

    Ok(())
}
