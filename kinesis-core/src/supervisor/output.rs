//! Supervisor tick inputs and outputs

use heapless::Vec;

use crate::state::Transition;

/// Most state changes a single tick can produce (Init → Idle → Active)
pub const MAX_TRANSITIONS_PER_TICK: usize = 4;

/// Transitions collected during one tick
pub type Transitions = Vec<Transition, MAX_TRANSITIONS_PER_TICK>;

/// Observations fed to the supervisor each tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickInput {
    /// Current value of the sample counter
    pub sample_count: u32,
    /// Whether sampling reported a successful start
    pub sampling_ok: bool,
    /// Smoothed amplitude from the extractor
    pub amplitude: u16,
}

/// What to do with the motor this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DriveCommand {
    /// Not a motor-update tick; leave the output alone
    Hold,
    /// Write this drive level
    Set(u16),
    /// Force the output to zero
    ForceOff,
}

impl DriveCommand {
    /// Level that will be written, if any
    pub fn level(&self) -> Option<u16> {
        match self {
            DriveCommand::Hold => None,
            DriveCommand::Set(level) => Some(*level),
            DriveCommand::ForceOff => Some(0),
        }
    }
}

/// Effects requested by one supervisor tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickOutput {
    pub drive: DriveCommand,
    /// Calibration policy after this tick
    pub auto_calibration: bool,
    pub transitions: Transitions,
}

impl TickOutput {
    pub(crate) fn new(auto_calibration: bool) -> Self {
        Self {
            drive: DriveCommand::Hold,
            auto_calibration,
            transitions: Vec::new(),
        }
    }
}
