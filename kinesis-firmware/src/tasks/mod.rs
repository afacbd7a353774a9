//! Embassy async tasks
//!
//! Each task runs independently and communicates via channels/signals.
//! The sampler runs on the interrupt executor, everything else in thread
//! mode.

pub mod control;
pub mod sampler;
pub mod serial_rx;
pub mod serial_tx;

pub use control::{control_task, HwWatchdog};
pub use sampler::sampler_task;
pub use serial_rx::serial_rx_task;
pub use serial_tx::serial_tx_task;
