//! Motor driver implementations
//!
//! - PWM motor: a single low-side switch or H-bridge enable pin driven by
//!   a PWM channel, speed proportional to duty cycle

pub mod pwm;

pub use pwm::{MotorError, PwmMotor};
