//! End-to-end control loop scenarios against mock hardware
//!
//! Each test owns a real `SampleRing`, pushes one sample per simulated
//! millisecond through the writer (as the sampling interrupt would) and
//! polls the control loop once per millisecond.

use std::collections::VecDeque;

use kinesis_core::audio::{SampleReader, SampleRing, SampleWriter};
use kinesis_core::config::{ControlConfig, DEFAULT_BUFFER_SIZE};
use kinesis_core::control::{ControlLoop, PollReport};
use kinesis_core::state::{FaultReason, State};
use kinesis_core::traits::{CommandSource, MotorOutput, Watchdog};
use kinesis_core::Command;
use kinesis_protocol::CommandDecoder;

const N: usize = DEFAULT_BUFFER_SIZE;
const SILENCE: u16 = 512;
const LOUD: u16 = SILENCE + 40;

#[derive(Default)]
struct RecordingMotor {
    writes: Vec<u16>,
}

impl RecordingMotor {
    fn last(&self) -> Option<u16> {
        self.writes.last().copied()
    }
}

impl MotorOutput for RecordingMotor {
    fn set_drive(&mut self, level: u16) {
        self.writes.push(level);
    }
}

#[derive(Default)]
struct CountingWatchdog {
    feeds: u32,
}

impl Watchdog for CountingWatchdog {
    fn feed(&mut self) {
        self.feeds += 1;
    }
}

/// Commands typed on the serial console, decoded byte by byte
#[derive(Default)]
struct Console {
    decoder: CommandDecoder,
    pending: VecDeque<Command>,
}

impl Console {
    fn type_bytes(&mut self, bytes: &[u8]) {
        let pending = &mut self.pending;
        self.decoder.feed_slice(bytes, |cmd| pending.push_back(cmd));
    }
}

impl CommandSource for Console {
    fn poll_command(&mut self) -> Option<Command> {
        self.pending.pop_front()
    }
}

type Loop<'a> = ControlLoop<N, SampleReader<'a, N>, RecordingMotor, CountingWatchdog, Console>;

struct Rig<'a> {
    writer: SampleWriter<'a, N>,
    control: Loop<'a>,
    now: u32,
}

impl<'a> Rig<'a> {
    fn new(ring: &'a SampleRing<N>, config: ControlConfig) -> Self {
        let (mut writer, reader) = ring.split(1023).unwrap();
        writer.prime(config.silence_baseline);
        writer.mark_started();

        let control = ControlLoop::new(
            config,
            0,
            reader,
            RecordingMotor::default(),
            CountingWatchdog::default(),
            Console::default(),
        )
        .unwrap();

        Self {
            writer,
            control,
            now: 0,
        }
    }

    /// One millisecond: an optional sample, then one poll
    fn step(&mut self, sample: Option<u16>) -> PollReport {
        self.now += 1;
        if let Some(sample) = sample {
            self.writer.push(sample);
        }
        let report = self.control.poll(self.now);
        if report.state.is_passive() {
            assert_eq!(report.drive, 0, "nonzero drive in {:?}", report.state);
            assert_eq!(report.written.unwrap_or(0), 0);
        }
        report
    }

    fn run(&mut self, ms: u32, sample: u16) -> PollReport {
        let mut last = self.step(Some(sample));
        for _ in 1..ms {
            last = self.step(Some(sample));
        }
        last
    }

    fn type_bytes(&mut self, bytes: &[u8]) {
        self.control.commands_mut().type_bytes(bytes);
    }

    fn state(&self) -> State {
        self.control.supervisor().state()
    }
}

#[test]
fn test_silence_settles_idle() {
    let ring = SampleRing::new();
    let mut rig = Rig::new(&ring, ControlConfig::default());

    let report = rig.run(50, SILENCE);

    assert_eq!(report.state, State::Idle);
    assert_eq!(report.amplitude, 0);
    assert_eq!(report.baseline, SILENCE);
    assert_eq!(rig.control.motor().last(), Some(0));
    assert_eq!(rig.control.watchdog().feeds, 50);
}

#[test]
fn test_sound_drives_motor_then_silence_returns_idle() {
    let config = ControlConfig::default();
    let ring = SampleRing::new();
    let mut rig = Rig::new(&ring, config);

    // Past the calibration warm-up
    rig.run(600, SILENCE);
    assert_eq!(rig.state(), State::Idle);

    // The buffer needs a few samples before the amplitude crosses the
    // enter threshold, then the debounce window must pass
    let mut loud_ms = 0;
    while rig.state() == State::Idle {
        rig.step(Some(LOUD));
        loud_ms += 1;
        assert!(loud_ms <= 100, "never went active");
    }
    assert!(loud_ms > config.enter_debounce_ms);
    assert_eq!(rig.control.extractor().baseline(), SILENCE);

    // First Active tick is a motor-update tick
    let report = rig.step(Some(LOUD));
    assert_eq!(report.state, State::Active);
    assert!(report.drive > 0);
    assert!(!rig.control.extractor().auto_calibration());

    // Ramp up under the slew limit
    let mut prev = report.drive;
    for _ in 0..400 {
        let report = rig.step(Some(LOUD));
        assert!(prev.abs_diff(report.drive) <= config.slew_step);
        prev = report.drive;
    }
    assert!(prev >= config.min_drive);

    // Silence: drive ramps down, then Idle once the timeout has passed
    let budget = config.idle_timeout_ms + config.slew_drain_ms() + 100;
    let mut silent_ms = 0;
    while rig.state() == State::Active {
        let report = rig.step(Some(SILENCE));
        assert!(prev.abs_diff(report.drive) <= config.slew_step);
        prev = report.drive;
        silent_ms += 1;
        assert!(silent_ms <= budget, "never returned to idle");
    }
    assert!(silent_ms > config.idle_timeout_ms);
    assert_eq!(rig.control.supervisor().drive(), 0);
    assert_eq!(rig.control.motor().last(), Some(0));
    assert!(rig.control.extractor().auto_calibration());
}

#[test]
fn test_short_burst_is_ignored() {
    let ring = SampleRing::new();
    let mut rig = Rig::new(&ring, ControlConfig::default());
    rig.run(600, SILENCE);

    for _ in 0..5 {
        rig.run(30, LOUD);
        rig.run(40, SILENCE);
    }

    assert_eq!(rig.state(), State::Idle);
    assert!(rig.control.motor().writes.iter().all(|&w| w == 0));
}

#[test]
fn test_sampling_stall_latches_fault() {
    let config = ControlConfig::default();
    let ring = SampleRing::new();
    let mut rig = Rig::new(&ring, config);
    rig.run(600, SILENCE);
    rig.run(100, LOUD);
    assert_eq!(rig.state(), State::Active);

    // Interrupt stops firing
    for _ in 0..config.stall_timeout_ms {
        rig.step(None);
    }
    assert_eq!(rig.state(), State::Active);
    let report = rig.step(None);
    assert_eq!(report.state, State::Fault(FaultReason::SamplingStalled));
    assert_eq!(rig.control.motor().last(), Some(0));

    // Sampling recovers but the fault is sticky
    let report = rig.run(1000, LOUD);
    assert_eq!(report.state, State::Fault(FaultReason::SamplingStalled));
    assert!(rig.control.supervisor().fault_latched());
    assert_eq!(rig.control.watchdog().feeds, 600 + 100 + 251 + 1000);

    rig.type_bytes(b"r\r\n");
    let report = rig.step(Some(SILENCE));
    assert_eq!(report.commands.as_slice(), &[Command::Reset]);
    assert_eq!(report.state, State::Idle);
    assert!(!rig.control.supervisor().fault_latched());
}

#[test]
fn test_sampling_never_started() {
    let ring: SampleRing<N> = SampleRing::new();
    let (mut writer, reader) = ring.split(1023).unwrap();
    writer.prime(SILENCE);

    let mut control = ControlLoop::new(
        ControlConfig::default(),
        0,
        reader,
        RecordingMotor::default(),
        CountingWatchdog::default(),
        Console::default(),
    )
    .unwrap();

    writer.push(SILENCE);
    let report = control.poll(1);

    assert_eq!(report.state, State::Fault(FaultReason::SamplingNotStarted));
    assert_eq!(control.motor().last(), Some(0));
}

#[test]
fn test_shutdown_and_wake_over_serial() {
    let ring = SampleRing::new();
    let mut rig = Rig::new(&ring, ControlConfig::default());
    rig.run(600, SILENCE);
    rig.run(200, LOUD);
    assert_eq!(rig.state(), State::Active);
    assert!(rig.control.supervisor().drive() > 0);

    rig.type_bytes(b"S\n");
    let report = rig.step(Some(LOUD));
    assert_eq!(report.state, State::Shutdown);
    assert_eq!(report.written, Some(0));

    // Still shut down while sound continues; reset does not wake it
    rig.run(500, LOUD);
    rig.type_bytes(b"R");
    let report = rig.step(Some(LOUD));
    assert_eq!(report.state, State::Shutdown);
    assert!(report.transitions.is_empty());

    rig.type_bytes(b"w");
    let report = rig.step(Some(SILENCE));
    assert_eq!(report.state, State::Idle);
    assert!(rig.control.extractor().auto_calibration());
}

#[test]
fn test_repeated_shutdown_is_not_lost() {
    let ring = SampleRing::new();
    let mut rig = Rig::new(&ring, ControlConfig::default());
    rig.run(600, SILENCE);
    rig.run(200, LOUD);
    assert_eq!(rig.state(), State::Active);

    // Shutdown, Wake, Shutdown typed faster than one tick
    rig.type_bytes(b"sws");
    let report = rig.step(Some(LOUD));
    assert_eq!(report.commands.as_slice(), &[Command::Shutdown, Command::Wake]);
    assert_eq!(report.state, State::Idle);

    let report = rig.step(Some(LOUD));
    assert_eq!(report.commands.as_slice(), &[Command::Shutdown]);
    assert_eq!(report.state, State::Shutdown);
    assert_eq!(rig.control.motor().last(), Some(0));

    // Nothing left over
    let report = rig.run(100, LOUD);
    assert!(report.commands.is_empty());
    assert_eq!(rig.state(), State::Shutdown);
}

#[test]
fn test_noise_bytes_are_ignored() {
    let ring = SampleRing::new();
    let mut rig = Rig::new(&ring, ControlConfig::default());
    rig.run(10, SILENCE);

    rig.type_bytes(b"hello?\r\n");
    let report = rig.step(Some(SILENCE));

    assert!(report.commands.is_empty());
    assert_eq!(report.state, State::Idle);
}
