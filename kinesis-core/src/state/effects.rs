//! State entry effects
//!
//! What must happen whenever a state is entered. This is a total function
//! of the destination; the supervisor applies it on every actual change.

use super::machine::State;

/// Side effects of entering a state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EntryEffects {
    /// Whether the extractor's baseline may adapt
    pub auto_calibration: bool,
    /// Whether the motor is forced to zero on entry
    pub motor_off: bool,
    /// Whether the last-non-silent timestamp restarts at entry time
    pub refresh_silence_timer: bool,
}

impl State {
    /// Effects of entering this state
    pub fn entry_effects(&self) -> EntryEffects {
        match self {
            State::Init => EntryEffects {
                auto_calibration: true,
                motor_off: true,
                refresh_silence_timer: true,
            },
            State::Idle => EntryEffects {
                auto_calibration: true,
                motor_off: true,
                refresh_silence_timer: false,
            },
            State::Active => EntryEffects {
                auto_calibration: false,
                motor_off: false,
                refresh_silence_timer: true,
            },
            State::Fault(_) | State::Shutdown => EntryEffects {
                auto_calibration: false,
                motor_off: true,
                refresh_silence_timer: false,
            },
        }
    }
}

/// A state change that happened during a tick or command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Transition {
    pub from: State,
    pub to: State,
}
