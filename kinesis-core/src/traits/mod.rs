//! Hardware abstraction traits
//!
//! These traits define the interface between the control logic and the
//! board: where samples come from, where drive levels go, how the watchdog
//! is fed and how operator commands arrive.

pub mod motor;
pub mod sampling;
pub mod system;

pub use motor::MotorOutput;
pub use sampling::SampleSource;
pub use system::{CommandSource, NoCommands, NoWatchdog, Watchdog};
