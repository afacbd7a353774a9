//! Sampling liveness monitor
//!
//! Watches the sample counter published by the sampling interrupt. If the
//! counter stands still for longer than the stall timeout, sampling has
//! died (timer stopped, interrupt masked) and the loudness data is stale.

use crate::state::FaultReason;

/// Safety condition status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SafetyStatus {
    /// All conditions normal
    Ok,
    /// Safety condition violated
    Fault(FaultReason),
}

/// Tracks when the sample counter last advanced
#[derive(Debug, Clone)]
pub struct LivenessMonitor {
    /// Counter value seen on the last observation
    last_count: u32,
    /// Time the counter was last seen to change (ms)
    last_advance_ms: u32,
    /// Longest tolerated standstill (ms)
    stall_timeout_ms: u32,
}

impl LivenessMonitor {
    /// Create a monitor seeded with the current counter value
    pub fn new(now_ms: u32, sample_count: u32, stall_timeout_ms: u32) -> Self {
        Self {
            last_count: sample_count,
            last_advance_ms: now_ms,
            stall_timeout_ms,
        }
    }

    /// Record the counter value for this tick
    ///
    /// Any change counts as progress, including wrap-around.
    pub fn observe(&mut self, now_ms: u32, sample_count: u32) {
        if sample_count != self.last_count {
            self.last_count = sample_count;
            self.last_advance_ms = now_ms;
        }
    }

    /// Whether the counter has been still for longer than the timeout
    pub fn is_stalled(&self, now_ms: u32) -> bool {
        now_ms.wrapping_sub(self.last_advance_ms) > self.stall_timeout_ms
    }

    /// Observe and check in one step
    ///
    /// With `enforce == false` (Fault and Shutdown) the counter is still
    /// tracked, but a stall is not reported.
    pub fn check(&mut self, now_ms: u32, sample_count: u32, enforce: bool) -> SafetyStatus {
        self.observe(now_ms, sample_count);

        if enforce && self.is_stalled(now_ms) {
            return SafetyStatus::Fault(FaultReason::SamplingStalled);
        }

        SafetyStatus::Ok
    }
}
