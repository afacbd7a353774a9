//! Build script for kinesis-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates kinesis.toml at compile time
//! - Generates the sample buffer length from `[sampling] buffer_size`

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Buffer length used when kinesis.toml does not set one
const DEFAULT_BUFFER_SIZE: i64 = 20;

/// Integer keys and their accepted ranges (inclusive)
const INTEGER_KEYS: &[(&str, &str, i64, i64)] = &[
    ("sampling", "buffer_size", 1, 256),
    ("sampling", "sample_rate_hz", 100, 10_000),
    ("sampling", "silence_baseline", 0, 1023),
    ("sampling", "adc_max", 1, 1023),
    ("thresholds", "active_enter", 1, 1023),
    ("thresholds", "active_exit", 0, 1023),
    ("thresholds", "max_amplitude", 1, 1023),
    ("timing", "enter_debounce_ms", 0, 60_000),
    ("timing", "idle_timeout_ms", 0, 600_000),
    ("timing", "stall_timeout_ms", 1, 60_000),
    ("timing", "calibration_warmup_ms", 0, 60_000),
    ("timing", "motor_update_interval_ms", 1, 1000),
    ("drive", "min", 0, 65_535),
    ("drive", "max", 0, 65_535),
    ("drive", "max_hw", 1, 65_535),
    ("drive", "slew_step", 1, 65_535),
    ("drive", "pwm_top", 1, 65_534),
    ("watchdog", "timeout_ms", 1, 8300),
    ("telemetry", "interval_ms", 1, 60_000),
    ("telemetry", "baud", 300, 921_600),
];

const TELEMETRY_MODES: &[&str] = &["status", "loudness", "off"];

fn main() {
    setup_linker();
    let config = validate_config();
    generate_buffer_size(&config);
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());
    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    if env::var_os("CARGO_FEATURE_DEFMT").is_some() {
        println!("cargo:rustc-link-arg-bins=-Tdefmt.x");
    }

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate kinesis.toml configuration at compile time
fn validate_config() -> toml::Value {
    println!("cargo:rerun-if-changed=kinesis.toml");

    let config_path = Path::new("kinesis.toml");

    if !config_path.exists() {
        fail(
            "kinesis.toml not found!",
            &[
                "The firmware embeds kinesis.toml as its configuration.".to_string(),
                "Create one in the kinesis-firmware directory.".to_string(),
            ],
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => fail("Failed to read kinesis.toml", &[e.to_string()]),
    };

    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let lines: Vec<String> = e.to_string().lines().map(str::to_string).collect();
            fail("Invalid TOML syntax in kinesis.toml", &lines);
        }
    };

    let mut errors = Vec::new();
    validate_ranges(&config, &mut errors);
    validate_telemetry(&config, &mut errors);
    validate_ordering(&config, &mut errors);

    if !errors.is_empty() {
        fail("Invalid configuration in kinesis.toml", &errors);
    }

    println!("cargo:warning=kinesis.toml validated successfully");
    config
}

/// Write `$OUT_DIR/buffer_size.rs` for `include!` from the firmware
fn generate_buffer_size(config: &toml::Value) {
    let size = integer(config, "sampling", "buffer_size").unwrap_or(DEFAULT_BUFFER_SIZE);

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let mut f = File::create(out_dir.join("buffer_size.rs")).unwrap();
    writeln!(f, "/// Rolling sample buffer length (from kinesis.toml)").unwrap();
    writeln!(f, "pub const BUFFER_SIZE: usize = {};", size).unwrap();
}

/// Look up `[section] key` as an integer
fn integer(config: &toml::Value, section: &str, key: &str) -> Option<i64> {
    config.get(section)?.get(key)?.as_integer()
}

/// Check value types and ranges of every known key
fn validate_ranges(config: &toml::Value, errors: &mut Vec<String>) {
    for &(section, key, min, max) in INTEGER_KEYS {
        let value = match config.get(section).and_then(|s| s.get(key)) {
            Some(value) => value,
            None => continue,
        };

        match value.as_integer() {
            Some(n) if (min..=max).contains(&n) => {}
            Some(_) => errors.push(format!("[{}] {} must be {}-{}", section, key, min, max)),
            None => errors.push(format!("[{}] {} must be an integer", section, key)),
        }
    }
}

fn validate_telemetry(config: &toml::Value, errors: &mut Vec<String>) {
    if let Some(mode) = config.get("telemetry").and_then(|t| t.get("mode")) {
        match mode.as_str() {
            Some(mode) if TELEMETRY_MODES.contains(&mode) => {}
            _ => errors.push("[telemetry] mode must be 'status', 'loudness', or 'off'".to_string()),
        }
    }
}

/// Cross-key checks, using the defaults for keys that are absent
fn validate_ordering(config: &toml::Value, errors: &mut Vec<String>) {
    let get = |section: &str, key: &str, default: i64| integer(config, section, key).unwrap_or(default);

    let enter = get("thresholds", "active_enter", 15);
    let exit = get("thresholds", "active_exit", 8);
    let max_amplitude = get("thresholds", "max_amplitude", 512);
    let baseline = get("sampling", "silence_baseline", 512);
    let adc_max = get("sampling", "adc_max", 1023);
    let min_drive = get("drive", "min", 80);
    let max_drive = get("drive", "max", 255);
    let max_hw = get("drive", "max_hw", 255);

    if exit >= enter {
        errors.push("active_exit must be below active_enter".to_string());
    }
    if max_amplitude <= exit {
        errors.push("max_amplitude must be above active_exit".to_string());
    }
    if baseline > adc_max {
        errors.push("silence_baseline must not exceed adc_max".to_string());
    }
    if min_drive > max_drive {
        errors.push("[drive] min must not exceed max".to_string());
    }
    if max_drive > max_hw {
        errors.push("[drive] max must not exceed max_hw".to_string());
    }
}

/// Abort the build with a boxed error message
fn fail(title: &str, lines: &[String]) -> ! {
    let body = lines
        .iter()
        .map(|line| {
            let truncated = if line.len() > 62 {
                format!("{}...", &line[..59])
            } else {
                line.clone()
            };
            format!("║  • {:<62} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n");

    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<56} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title, body
    );
}
