//! Control loop composition
//!
//! [`ControlLoop`] wires the extractor and supervisor to the four hardware
//! seams. One [`ControlLoop::poll`] is one tick:
//!
//! 1. drain commands in arrival order, stopping at the first repeat of a
//!    kind already handled this poll (it is held for the next poll)
//! 2. push the calibration policy into the extractor and extract
//! 3. tick the supervisor
//! 4. apply the drive command and calibration policy
//! 5. feed the watchdog
//!
//! Nothing here blocks, so the firmware can call `poll` from a ticker and
//! tests can call it in a plain loop.

use heapless::Vec;
use kinesis_protocol::Command;

use crate::audio::AmplitudeExtractor;
use crate::config::{ConfigError, ControlConfig};
use crate::state::{State, Transition};
use crate::supervisor::{DriveCommand, Supervisor, TickInput};
use crate::traits::{CommandSource, MotorOutput, SampleSource, Watchdog};

/// Most state changes one poll can report (commands plus tick)
pub const MAX_TRANSITIONS_PER_POLL: usize = 8;

/// Summary of one poll, for diagnostics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollReport {
    /// State after the poll
    pub state: State,
    pub amplitude: u16,
    pub baseline: u16,
    /// Supervisor drive level after the poll
    pub drive: u16,
    /// Level written to the motor this poll, if any
    pub written: Option<u16>,
    /// Commands that were honoured, in order
    pub commands: Vec<Command, 3>,
    /// State changes, in order
    pub transitions: Vec<Transition, MAX_TRANSITIONS_PER_POLL>,
}

impl PollReport {
    /// Whether this poll was a motor-update tick
    pub fn motor_updated(&self) -> bool {
        self.written.is_some()
    }
}

/// Extractor + supervisor bound to their hardware
pub struct ControlLoop<const N: usize, S, M, W, C> {
    source: S,
    motor: M,
    watchdog: W,
    commands: C,
    /// Command taken from the source but deferred to the next poll
    pending: Option<Command>,
    extractor: AmplitudeExtractor<N>,
    supervisor: Supervisor,
}

impl<const N: usize, S, M, W, C> ControlLoop<N, S, M, W, C>
where
    S: SampleSource<N>,
    M: MotorOutput,
    W: Watchdog,
    C: CommandSource,
{
    /// Validate `config` and build a loop in Init, with the motor off
    pub fn new(
        config: ControlConfig,
        now_ms: u32,
        source: S,
        mut motor: M,
        watchdog: W,
        commands: C,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        motor.force_off();
        let supervisor = Supervisor::new(config, now_ms, source.sample_count());

        Ok(Self {
            source,
            motor,
            watchdog,
            commands,
            pending: None,
            extractor: AmplitudeExtractor::new(config.silence_baseline),
            supervisor,
        })
    }

    /// Run one control tick
    pub fn poll(&mut self, now_ms: u32) -> PollReport {
        let mut commands = Vec::new();
        let mut transitions = Vec::new();
        let mut written = None;

        let mut seen = [false; 3];
        while let Some(command) = self.pending.take().or_else(|| self.commands.poll_command()) {
            if core::mem::replace(&mut seen[command.index()], true) {
                self.pending = Some(command);
                break;
            }
            let _ = commands.push(command);

            if let Some(transition) = self.supervisor.command(now_ms, command) {
                if transition.to.entry_effects().motor_off {
                    self.motor.force_off();
                    written = Some(0);
                }
                let _ = transitions.push(transition);
            }
        }

        self.extractor
            .set_auto_calibration(self.supervisor.auto_calibration());
        let amplitude = self.extractor.update(&self.source);

        let input = TickInput {
            sample_count: self.source.sample_count(),
            sampling_ok: self.source.latest_ok(),
            amplitude,
        };
        let out = self.supervisor.tick(now_ms, input);

        match out.drive {
            DriveCommand::Hold => {}
            DriveCommand::Set(level) => {
                self.motor.set_drive(level);
                written = Some(level);
            }
            DriveCommand::ForceOff => {
                self.motor.force_off();
                written = Some(0);
            }
        }
        self.extractor.set_auto_calibration(out.auto_calibration);
        for transition in out.transitions {
            let _ = transitions.push(transition);
        }

        self.watchdog.feed();

        PollReport {
            state: self.supervisor.state(),
            amplitude,
            baseline: self.extractor.baseline(),
            drive: self.supervisor.drive(),
            written,
            commands,
            transitions,
        }
    }

    pub fn supervisor(&self) -> &Supervisor {
        &self.supervisor
    }

    pub fn extractor(&self) -> &AmplitudeExtractor<N> {
        &self.extractor
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn motor(&self) -> &M {
        &self.motor
    }

    pub fn watchdog(&self) -> &W {
        &self.watchdog
    }

    pub fn commands_mut(&mut self) -> &mut C {
        &mut self.commands
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::FaultReason;
    use crate::traits::NoWatchdog;

    const N: usize = 4;

    /// Sample source with directly settable contents
    struct FakeSource {
        level: u16,
        count: u32,
        ok: bool,
    }

    impl SampleSource<N> for FakeSource {
        fn sample_count(&self) -> u32 {
            self.count
        }

        fn latest_ok(&self) -> bool {
            self.ok
        }

        fn snapshot(&self, out: &mut [u16; N]) {
            *out = [self.level; N];
        }
    }

    #[derive(Default)]
    struct LastLevel {
        level: Option<u16>,
        writes: u32,
    }

    impl MotorOutput for LastLevel {
        fn set_drive(&mut self, level: u16) {
            self.level = Some(level);
            self.writes += 1;
        }
    }

    #[derive(Default)]
    struct Script(std::collections::VecDeque<Command>);

    impl CommandSource for Script {
        fn poll_command(&mut self) -> Option<Command> {
            self.0.pop_front()
        }
    }

    fn control(ok: bool) -> ControlLoop<N, FakeSource, LastLevel, NoWatchdog, Script> {
        let source = FakeSource {
            level: 512,
            count: 0,
            ok,
        };
        ControlLoop::new(
            ControlConfig::default(),
            0,
            source,
            LastLevel::default(),
            NoWatchdog,
            Script::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = ControlConfig {
            active_exit_threshold: 20,
            ..Default::default()
        };
        let source = FakeSource {
            level: 512,
            count: 0,
            ok: true,
        };
        let result: Result<ControlLoop<N, _, _, _, _>, _> = ControlLoop::new(
            config,
            0,
            source,
            LastLevel::default(),
            NoWatchdog,
            Script::default(),
        );
        assert!(matches!(result, Err(ConfigError::ThresholdOrder)));
    }

    #[test]
    fn test_motor_off_at_construction() {
        let control = control(true);
        assert_eq!(control.motor().level, Some(0));
        assert_eq!(control.motor().writes, 1);
    }

    #[test]
    fn test_first_poll_enters_idle() {
        let mut control = control(true);
        control.source.count = 1;

        let report = control.poll(1);

        assert_eq!(report.state, State::Idle);
        assert_eq!(report.amplitude, 0);
        assert_eq!(report.written, Some(0));
        assert_eq!(report.transitions.len(), 1);
    }

    #[test]
    fn test_sampling_never_started() {
        let mut control = control(false);
        let report = control.poll(1);
        assert_eq!(report.state, State::Fault(FaultReason::SamplingNotStarted));
    }

    #[test]
    fn test_repeated_command_waits_for_next_poll() {
        let mut control = control(true);
        control.source.count = 1;
        control.poll(1);

        control.commands_mut().0.extend([
            Command::Shutdown,
            Command::Wake,
            Command::Shutdown,
            Command::Wake,
        ]);
        control.source.count = 2;
        let report = control.poll(2);

        assert_eq!(report.commands.as_slice(), &[Command::Shutdown, Command::Wake]);
        assert_eq!(report.state, State::Idle);
        assert_eq!(
            report.transitions.as_slice(),
            &[
                Transition {
                    from: State::Idle,
                    to: State::Shutdown
                },
                Transition {
                    from: State::Shutdown,
                    to: State::Idle
                },
            ]
        );
        // The second Shutdown is held, the second Wake still queued
        assert_eq!(control.pending, Some(Command::Shutdown));
        assert_eq!(control.commands_mut().0.len(), 1);

        control.source.count = 3;
        let report = control.poll(3);
        assert_eq!(report.commands.as_slice(), &[Command::Shutdown, Command::Wake]);
        assert_eq!(report.state, State::Idle);
        assert_eq!(control.pending, None);
        assert!(control.commands_mut().0.is_empty());
    }

    #[test]
    fn test_nothing_pending_without_repeats() {
        let mut control = control(true);
        control.source.count = 1;
        control.poll(1);

        control.commands_mut().0.extend([Command::Shutdown, Command::Wake, Command::Reset]);
        control.source.count = 2;
        let report = control.poll(2);

        assert_eq!(report.commands.len(), 3);
        assert_eq!(control.pending, None);
    }

    #[test]
    fn test_calibration_frozen_outside_idle() {
        let mut control = control(true);
        control.source.count = 1;
        control.poll(1);
        assert!(control.extractor().auto_calibration());

        control.commands_mut().0.push_back(Command::Shutdown);
        control.source.count = 2;
        control.poll(2);
        assert!(!control.extractor().auto_calibration());
    }
}
