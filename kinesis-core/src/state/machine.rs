//! State machine definition
//!
//! Motor permission and calibration policy are a function of the current
//! state; which state comes next is a function of the state and an event.

use super::events::Event;

/// Supervisor states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    /// Power-on: waiting to confirm that sampling started
    Init,
    /// Quiet: motor off, baseline calibrating
    Idle,
    /// Sound present: motor follows the amplitude
    Active,
    /// Fault latched; outputs disabled until Reset
    Fault(FaultReason),
    /// Operator stop; outputs disabled until Wake
    Shutdown,
}

/// Why the supervisor latched a fault
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FaultReason {
    /// The sample counter stopped advancing
    SamplingStalled,
    /// Sampling never reported a successful start
    SamplingNotStarted,
}

impl FaultReason {
    /// Human-readable reason, as reported over serial
    pub fn as_str(&self) -> &'static str {
        match self {
            FaultReason::SamplingStalled => "audio sampling stalled (timer not advancing)",
            FaultReason::SamplingNotStarted => "sampling failed to start",
        }
    }
}

impl State {
    /// Upper-case state name, as reported over serial
    pub fn name(&self) -> &'static str {
        match self {
            State::Init => "INIT",
            State::Idle => "IDLE",
            State::Active => "ACTIVE",
            State::Fault(_) => "FAULT",
            State::Shutdown => "SHUTDOWN",
        }
    }

    /// Check if this state allows nonzero drive
    pub fn motor_allowed(&self) -> bool {
        matches!(self, State::Active)
    }

    /// Check if the motor must be held off on every tick
    pub fn is_passive(&self) -> bool {
        !self.motor_allowed()
    }

    /// Check if this is a fault state
    pub fn is_fault(&self) -> bool {
        matches!(self, State::Fault(_))
    }

    /// Check if the sampling stall check applies in this state
    pub fn monitors_liveness(&self) -> bool {
        !matches!(self, State::Fault(_) | State::Shutdown)
    }

    /// Process an event and return the next state
    pub fn transition(self, event: Event) -> Self {
        match (self, event) {
            // Operator stop wins everywhere
            (_, Event::Shutdown) => State::Shutdown,

            // Init transitions
            (State::Init, Event::SamplingVerified) => State::Idle,
            (State::Init, Event::FaultDetected(reason)) => State::Fault(reason),
            (State::Init, Event::Reset) => State::Init,

            // Idle transitions
            (State::Idle, Event::ActivityDetected) => State::Active,
            (State::Idle, Event::FaultDetected(reason)) => State::Fault(reason),
            (State::Idle, Event::Reset) => State::Init,

            // Active transitions
            (State::Active, Event::SilenceSettled) => State::Idle,
            (State::Active, Event::FaultDetected(reason)) => State::Fault(reason),
            (State::Active, Event::Reset) => State::Init,

            // Fault transitions
            (State::Fault(_), Event::Reset) => State::Init,

            // Shutdown transitions; a latched fault survives the stop
            (State::Shutdown, Event::Wake(None)) => State::Idle,
            (State::Shutdown, Event::Wake(Some(reason))) => State::Fault(reason),

            // Default: stay in current state
            _ => self,
        }
    }
}
