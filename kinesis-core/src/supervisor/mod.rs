//! Supervisor: the control-path orchestrator
//!
//! Owns the state machine, the fault latch and every timer. Each tick runs,
//! in order:
//!
//! 1. liveness check (may preempt into Fault from Init, Idle or Active)
//! 2. Init validation (success falls straight through to Idle logic)
//! 3. per-state logic
//! 4. motor-update gating (Active only)
//!
//! Operator commands are applied through [`Supervisor::command`] before the
//! tick. The supervisor never touches hardware; it returns a [`TickOutput`]
//! and the caller applies it.
//!
//! All times are milliseconds from a free-running `u32` clock. Elapsed time
//! is always `now.wrapping_sub(then)`, so the clock may wrap.

mod output;

pub use output::{DriveCommand, TickInput, TickOutput, Transitions, MAX_TRANSITIONS_PER_TICK};

use kinesis_protocol::Command;

use crate::config::ControlConfig;
use crate::motion::{MotionMapper, SlewLimiter};
use crate::safety::{Debounce, LivenessMonitor, SafetyStatus};
use crate::state::{Event, FaultReason, State, Transition};

/// Supervisor context
#[derive(Debug, Clone)]
pub struct Supervisor {
    config: ControlConfig,
    mapper: MotionMapper,
    slew: SlewLimiter,
    state: State,
    /// When the current state was entered
    entered_ms: u32,
    /// Set on Fault entry, cleared only by Reset
    latch: Option<FaultReason>,
    liveness: LivenessMonitor,
    /// Idle → Active hold timer
    debounce: Debounce,
    /// Last time the amplitude was above the exit threshold
    last_non_silent_ms: u32,
    /// Last drive update; `None` means the next Active tick is due
    last_motor_tick_ms: Option<u32>,
    drive: u16,
    auto_calibration: bool,
}

impl Supervisor {
    /// Create a supervisor in Init
    ///
    /// `sample_count` seeds the liveness monitor so the first tick does not
    /// see a stall.
    pub fn new(config: ControlConfig, now_ms: u32, sample_count: u32) -> Self {
        Self {
            mapper: MotionMapper::new(&config),
            slew: SlewLimiter::new(config.slew_step),
            state: State::Init,
            entered_ms: now_ms,
            latch: None,
            liveness: LivenessMonitor::new(now_ms, sample_count, config.stall_timeout_ms),
            debounce: Debounce::new(config.enter_debounce_ms),
            last_non_silent_ms: now_ms,
            last_motor_tick_ms: None,
            drive: 0,
            auto_calibration: true,
            config,
        }
    }

    /// Apply an operator command
    ///
    /// Returns the state change, if the command caused one.
    pub fn command(&mut self, now_ms: u32, command: Command) -> Option<Transition> {
        let event = match command {
            Command::Shutdown => Event::Shutdown,
            Command::Wake => Event::Wake(self.latch),
            Command::Reset => {
                if self.state == State::Shutdown {
                    return None;
                }
                self.latch = None;
                Event::Reset
            }
        };
        self.apply(now_ms, event)
    }

    /// Run one control tick
    pub fn tick(&mut self, now_ms: u32, input: TickInput) -> TickOutput {
        let mut out = TickOutput::new(self.auto_calibration);

        let status =
            self.liveness
                .check(now_ms, input.sample_count, self.state.monitors_liveness());
        if let SafetyStatus::Fault(reason) = status {
            self.step(now_ms, Event::FaultDetected(reason), &mut out);
            return self.finish(out);
        }

        if self.state == State::Init {
            let event = if input.sampling_ok {
                Event::SamplingVerified
            } else {
                Event::FaultDetected(FaultReason::SamplingNotStarted)
            };
            self.step(now_ms, event, &mut out);
        }

        match self.state {
            State::Idle => self.idle_tick(now_ms, input.amplitude, &mut out),
            State::Active => self.active_tick(now_ms, input.amplitude, &mut out),
            State::Init | State::Fault(_) | State::Shutdown => {
                self.drive = 0;
                out.drive = DriveCommand::ForceOff;
            }
        }

        self.finish(out)
    }

    fn idle_tick(&mut self, now_ms: u32, amplitude: u16, out: &mut TickOutput) {
        self.drive = 0;
        out.drive = DriveCommand::ForceOff;

        // Let the baseline settle before sound may wake the motor
        if now_ms.wrapping_sub(self.entered_ms) < self.config.calibration_warmup_ms {
            self.debounce.disarm();
            return;
        }

        let loud = amplitude >= self.config.active_enter_threshold;
        if self.debounce.update(now_ms, loud) {
            self.step(now_ms, Event::ActivityDetected, out);
        }
    }

    fn active_tick(&mut self, now_ms: u32, amplitude: u16, out: &mut TickOutput) {
        if amplitude > self.config.active_exit_threshold {
            self.last_non_silent_ms = now_ms;
        }

        let due = match self.last_motor_tick_ms {
            None => true,
            Some(last) => now_ms.wrapping_sub(last) >= self.config.motor_update_interval_ms,
        };
        if due {
            let target = self.mapper.map_to_target(amplitude);
            self.drive = self.slew.slew_towards(self.drive, target);
            self.last_motor_tick_ms = Some(now_ms);
            out.drive = DriveCommand::Set(self.drive);
        }

        let silent_ms = now_ms.wrapping_sub(self.last_non_silent_ms);
        if silent_ms > self.config.idle_timeout_ms && self.drive == 0 {
            self.step(now_ms, Event::SilenceSettled, out);
        }
    }

    /// Transition inside a tick, folding entry effects into `out`
    fn step(&mut self, now_ms: u32, event: Event, out: &mut TickOutput) {
        if let Some(transition) = self.apply(now_ms, event) {
            if transition.to.entry_effects().motor_off {
                out.drive = DriveCommand::ForceOff;
            }
            // Capacity covers the longest chain a tick can produce
            let _ = out.transitions.push(transition);
        }
    }

    fn finish(&self, mut out: TickOutput) -> TickOutput {
        out.auto_calibration = self.auto_calibration;
        out
    }

    /// Move the state machine and apply entry effects on an actual change
    fn apply(&mut self, now_ms: u32, event: Event) -> Option<Transition> {
        let from = self.state;
        let to = from.transition(event);
        if to == from {
            return None;
        }

        let effects = to.entry_effects();
        self.state = to;
        self.entered_ms = now_ms;
        self.auto_calibration = effects.auto_calibration;
        self.debounce.disarm();
        if effects.motor_off {
            self.drive = 0;
        }
        if effects.refresh_silence_timer {
            self.last_non_silent_ms = now_ms;
        }
        if to == State::Active {
            self.last_motor_tick_ms = None;
        }
        if let State::Fault(reason) = to {
            self.latch = Some(reason);
        }

        Some(Transition { from, to })
    }

    /// Current state
    pub fn state(&self) -> State {
        self.state
    }

    /// Whether a fault is latched (survives Shutdown)
    pub fn fault_latched(&self) -> bool {
        self.latch.is_some()
    }

    /// Latched fault reason
    pub fn fault_reason(&self) -> Option<FaultReason> {
        self.latch
    }

    /// Last commanded drive level
    pub fn drive(&self) -> u16 {
        self.drive
    }

    /// Calibration policy for the extractor
    pub fn auto_calibration(&self) -> bool {
        self.auto_calibration
    }

    pub fn config(&self) -> &ControlConfig {
        &self.config
    }
}
