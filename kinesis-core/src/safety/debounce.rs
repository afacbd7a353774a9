//! Contiguous-hold debounce
//!
//! A condition must hold on every observation for the whole window. Any
//! observation where it does not hold disarms the timer; there is no
//! partial credit.

/// Time-based debounce for a boolean condition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Debounce {
    /// When the current unbroken run began
    since_ms: Option<u32>,
    window_ms: u32,
}

impl Debounce {
    /// Create a disarmed debounce with the given window
    pub const fn new(window_ms: u32) -> Self {
        Self {
            since_ms: None,
            window_ms,
        }
    }

    /// Feed one observation; returns true once the window has been held
    pub fn update(&mut self, now_ms: u32, condition: bool) -> bool {
        if !condition {
            self.since_ms = None;
            return false;
        }

        let since = *self.since_ms.get_or_insert(now_ms);
        now_ms.wrapping_sub(since) >= self.window_ms
    }

    /// Forget any run in progress
    pub fn disarm(&mut self) {
        self.since_ms = None;
    }

    /// Whether a run is in progress
    pub fn is_armed(&self) -> bool {
        self.since_ms.is_some()
    }
}
