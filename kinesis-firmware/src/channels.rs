//! Inter-task communication channels
//!
//! Defines the static channels used for communication between Embassy tasks.
//! Uses embassy-sync primitives for safe async communication.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;

use kinesis_core::traits::CommandSource;
use kinesis_protocol::{Command, ReportLine};

/// Channel capacity for operator commands from the serial port
const COMMAND_CHANNEL_SIZE: usize = 8;

/// Channel capacity for outgoing report lines
const REPORT_CHANNEL_SIZE: usize = 16;

/// Operator commands decoded from serial input
pub static COMMAND_CHANNEL: Channel<CriticalSectionRawMutex, Command, COMMAND_CHANNEL_SIZE> =
    Channel::new();

/// Encoded report lines waiting for the serial transmitter
pub static REPORT_CHANNEL: Channel<CriticalSectionRawMutex, ReportLine, REPORT_CHANNEL_SIZE> =
    Channel::new();

/// Set by the sampler once its first conversion has been attempted
/// Value is whether that conversion succeeded
pub static SAMPLER_STARTED: Signal<CriticalSectionRawMutex, bool> = Signal::new();

/// Non-blocking view of [`COMMAND_CHANNEL`] for the control loop
pub struct ChannelCommands;

impl CommandSource for ChannelCommands {
    fn poll_command(&mut self) -> Option<Command> {
        COMMAND_CHANNEL.try_receive().ok()
    }
}
