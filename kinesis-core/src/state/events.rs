//! Events that trigger state transitions

use super::machine::FaultReason;

/// Events that can trigger state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    // Supervisor events
    /// Sampling reported a successful start
    SamplingVerified,
    /// Amplitude held above the enter threshold for the debounce window
    ActivityDetected,
    /// Silence outlasted the idle timeout and the drive reached zero
    SilenceSettled,

    // Safety events
    /// Fault detected by the liveness check or Init validation
    FaultDetected(FaultReason),

    // Operator commands
    /// Stop the motor and hold it off
    Shutdown,
    /// Leave Shutdown; carries the latched fault, if any
    Wake(Option<FaultReason>),
    /// Clear the fault latch and revalidate from Init
    Reset,
}
