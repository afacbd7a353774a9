//! Safety monitoring
//!
//! Sampling liveness and threshold debouncing.

pub mod debounce;
pub mod monitor;

pub use debounce::Debounce;
pub use monitor::{LivenessMonitor, SafetyStatus};
