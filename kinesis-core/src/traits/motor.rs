//! Motor output trait
//!
//! The control core only ever issues a single integer drive level. How that
//! becomes a duty cycle (PWM width, timer compare value, DAC code) is the
//! implementor's business.

/// A single motor driven by an integer level
///
/// Level 0 means stopped. The upper bound is the configured hardware
/// ceiling ([`ControlConfig::max_drive_hw`](crate::config::ControlConfig)).
pub trait MotorOutput {
    /// Write a new drive level
    ///
    /// Called at most once per motor-update interval while Active.
    fn set_drive(&mut self, level: u16);

    /// Stop the motor immediately
    ///
    /// Called every tick the supervisor is in a passive state, so
    /// implementations must tolerate repeated calls.
    fn force_off(&mut self) {
        self.set_drive(0);
    }
}
