//! Slew-rate limiting for the drive level
//!
//! Bounds mechanical jerk and current spikes: the drive may move at most
//! one step per motor update, whatever the target does.

/// Fixed-step slew limiter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SlewLimiter {
    step: u16,
}

impl SlewLimiter {
    /// Create a limiter allowing `step` units of change per update
    pub const fn new(step: u16) -> Self {
        Self { step }
    }

    /// Maximum change per update
    pub const fn step(&self) -> u16 {
        self.step
    }

    /// Move `current` toward `target` by at most one step
    pub fn slew_towards(&self, current: u16, target: u16) -> u16 {
        if target > current {
            current.saturating_add(self.step).min(target)
        } else {
            current.saturating_sub(self.step).max(target)
        }
    }

    /// Number of updates needed to get from `current` to `target`
    pub fn updates_to_reach(&self, current: u16, target: u16) -> u32 {
        let distance = current.abs_diff(target) as u32;
        distance.div_ceil(self.step.max(1) as u32)
    }
}
