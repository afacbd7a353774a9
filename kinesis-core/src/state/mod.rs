//! Supervisor state machine
//!
//! The state machine is explicit, finite and deterministic. All motor and
//! calibration behaviour is a function of the current state and an event;
//! timers and the fault latch live in the supervisor context.

pub mod effects;
pub mod events;
pub mod machine;

pub use effects::{EntryEffects, Transition};
pub use events::Event;
pub use machine::{FaultReason, State};
