//! Control loop task
//!
//! Drives [`ControlLoop::poll`] from a 1 ms ticker and turns each poll
//! report into serial report lines. Reports go out through a bounded
//! channel with `try_send`; when the transmitter falls behind, lines are
//! dropped rather than delaying the next poll.

use defmt::*;
use embassy_rp::pwm::PwmOutput;
use embassy_time::{with_timeout, Duration, Instant, Ticker};

use kinesis_core::audio::SampleReader;
use kinesis_core::config::{BoardConfig, TelemetryMode};
use kinesis_core::control::{ControlLoop, PollReport};
use kinesis_core::state::{State, Transition};
use kinesis_core::traits::Watchdog;
use kinesis_drivers::motor::PwmMotor;
use kinesis_protocol::Report;

use crate::channels::{ChannelCommands, REPORT_CHANNEL, SAMPLER_STARTED};
use crate::BUFFER_SIZE;

/// Control tick period in milliseconds
pub const TICK_INTERVAL_MS: u64 = 1;

/// How long to wait for the sampler's first conversion before validating
const SAMPLER_START_TIMEOUT_MS: u64 = 100;

/// Hardware watchdog, armed before the control task starts
pub struct HwWatchdog(pub embassy_rp::watchdog::Watchdog);

impl Watchdog for HwWatchdog {
    fn feed(&mut self) {
        self.0.feed();
    }
}

type Motor = PwmMotor<PwmOutput<'static>>;

/// Control task - one control loop poll per millisecond
#[embassy_executor::task]
pub async fn control_task(
    reader: SampleReader<'static, BUFFER_SIZE>,
    motor: Motor,
    mut watchdog: HwWatchdog,
    config: BoardConfig,
) {
    info!("Control task started");

    // Validation in Init needs to see the sampler's first conversion
    let timeout = Duration::from_millis(SAMPLER_START_TIMEOUT_MS);
    match with_timeout(timeout, SAMPLER_STARTED.wait()).await {
        Ok(true) => debug!("Sampler running"),
        Ok(false) => warn!("Sampler reported a failed start"),
        Err(_) => warn!("Sampler did not start within {} ms", SAMPLER_START_TIMEOUT_MS),
    }
    watchdog.feed();

    let start = Instant::now();
    let mut control =
        match ControlLoop::new(config.control, 0, reader, motor, watchdog, ChannelCommands) {
            Ok(control) => control,
            Err(e) => {
                // config::load only hands out validated configs; without
                // feeds the watchdog resets the board
                error!("Control config invalid: {:?}", e);
                return;
            }
        };

    let mut telemetry = Telemetry::new(config.telemetry, config.telemetry_interval_ms);
    let mut ticker = Ticker::every(Duration::from_millis(TICK_INTERVAL_MS));
    let mut motor_errors = control.motor().error_count();

    loop {
        ticker.next().await;

        let now_ms = start.elapsed().as_millis() as u32;
        let report = control.poll(now_ms);

        for &command in &report.commands {
            debug!("Command: {:?}", command);
            send(Report::Ack(command));
        }
        for transition in &report.transitions {
            report_transition(transition, control.source().latest());
        }
        telemetry.update(now_ms, &report);

        let errors = control.motor().error_count();
        if errors != motor_errors {
            motor_errors = errors;
            warn!(
                "PWM write failed ({} total): {:?}",
                errors,
                control.motor().last_error()
            );
        }
    }
}

/// Log a state change and queue its report lines
fn report_transition(transition: &Transition, latest_sample: u16) {
    let to = transition.to;

    match to {
        State::Fault(reason) => {
            warn!("FAULT: {} (last sample {})", reason.as_str(), latest_sample);
            send(Report::StateChange {
                state: to.name(),
                motor_off: true,
            });
            send(Report::Fault {
                reason: reason.as_str(),
            });
        }
        _ => {
            info!("STATE: {} -> {}", transition.from.name(), to.name());
            send(Report::StateChange {
                state: to.name(),
                motor_off: to.is_passive() && to != State::Init,
            });
        }
    }
}

/// Encode and queue one report line, dropping it if the queue is full
fn send(report: Report<'_>) {
    let line = match report.encode() {
        Ok(line) => line,
        Err(e) => {
            warn!("Report not encodable: {:?}", e);
            return;
        }
    };

    if REPORT_CHANNEL.try_send(line).is_err() {
        warn!("Report channel full, dropping line");
    }
}

/// Rate limiter for status and loudness lines
struct Telemetry {
    mode: TelemetryMode,
    interval_ms: u32,
    last_ms: Option<u32>,
}

impl Telemetry {
    fn new(mode: TelemetryMode, interval_ms: u32) -> Self {
        Self {
            mode,
            interval_ms,
            last_ms: None,
        }
    }

    fn due(&mut self, now_ms: u32) -> bool {
        let due = match self.last_ms {
            None => true,
            Some(last) => now_ms.wrapping_sub(last) >= self.interval_ms,
        };
        if due {
            self.last_ms = Some(now_ms);
        }
        due
    }

    fn update(&mut self, now_ms: u32, report: &PollReport) {
        match self.mode {
            TelemetryMode::Off => {}
            TelemetryMode::Loudness => {
                if self.due(now_ms) {
                    send(Report::Loudness(report.amplitude));
                }
            }
            TelemetryMode::Status => {
                // Only on ticks that actually moved the motor
                if report.state == State::Active && report.motor_updated() && self.due(now_ms) {
                    trace!(
                        "amp={} dc={} drive={}",
                        report.amplitude,
                        report.baseline,
                        report.drive
                    );
                    send(Report::Status {
                        state: report.state.name(),
                        amplitude: report.amplitude,
                        baseline: report.baseline,
                        drive: report.drive,
                    });
                }
            }
        }
    }
}
