//! Watchdog and command channel traits

use kinesis_protocol::Command;

/// Hardware watchdog
pub trait Watchdog {
    /// Acknowledge liveness, postponing the hardware reset
    fn feed(&mut self);
}

/// Non-blocking source of operator commands
pub trait CommandSource {
    /// Take the next pending command, if any
    fn poll_command(&mut self) -> Option<Command>;
}

/// A command source that never produces anything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCommands;

impl CommandSource for NoCommands {
    fn poll_command(&mut self) -> Option<Command> {
        None
    }
}

/// A watchdog that is not armed
#[derive(Debug, Clone, Copy, Default)]
pub struct NoWatchdog;

impl Watchdog for NoWatchdog {
    fn feed(&mut self) {}
}
