//! Operator commands received over the serial link

/// Commands that can be injected into the supervisor from outside
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Intentional stop: motor off until Wake
    Shutdown,
    /// Leave Shutdown and resume listening
    Wake,
    /// Clear a latched fault and re-run start-up validation
    Reset,
}

// Wire format values (lowercase; uppercase is accepted on receive)
const CMD_SHUTDOWN: u8 = b's';
const CMD_WAKE: u8 = b'w';
const CMD_RESET: u8 = b'r';

impl Command {
    /// All commands, in wire-byte order
    pub const ALL: [Command; 3] = [Command::Shutdown, Command::Wake, Command::Reset];

    /// Parse a command from its wire format byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte.to_ascii_lowercase() {
            CMD_SHUTDOWN => Some(Command::Shutdown),
            CMD_WAKE => Some(Command::Wake),
            CMD_RESET => Some(Command::Reset),
            _ => None,
        }
    }

    /// Convert to wire format byte
    pub fn to_byte(self) -> u8 {
        match self {
            Command::Shutdown => CMD_SHUTDOWN,
            Command::Wake => CMD_WAKE,
            Command::Reset => CMD_RESET,
        }
    }

    /// Stable index (0..3), used for once-per-tick bookkeeping
    pub fn index(self) -> usize {
        match self {
            Command::Shutdown => 0,
            Command::Wake => 1,
            Command::Reset => 2,
        }
    }

    /// Upper-case name used in acknowledgements
    pub fn name(self) -> &'static str {
        match self {
            Command::Shutdown => "SHUTDOWN",
            Command::Wake => "WAKE",
            Command::Reset => "RESET",
        }
    }
}

/// Byte-stream decoder for incoming serial data
///
/// Filters a raw UART byte stream down to commands. Line endings, echo
/// noise and unknown bytes are skipped and counted.
#[derive(Debug, Clone, Default)]
pub struct CommandDecoder {
    ignored: u32,
}

impl CommandDecoder {
    /// Create a new decoder
    pub const fn new() -> Self {
        Self { ignored: 0 }
    }

    /// Feed one byte, returning a command if it was one
    pub fn feed(&mut self, byte: u8) -> Option<Command> {
        let cmd = Command::from_byte(byte);
        if cmd.is_none() && !matches!(byte, b'\r' | b'\n') {
            self.ignored = self.ignored.wrapping_add(1);
        }
        cmd
    }

    /// Decode a whole buffer, calling `on_command` for every command found
    pub fn feed_slice(&mut self, bytes: &[u8], mut on_command: impl FnMut(Command)) {
        for &byte in bytes {
            if let Some(cmd) = self.feed(byte) {
                on_command(cmd);
            }
        }
    }

    /// Number of non-command bytes seen (line endings excluded)
    pub fn ignored(&self) -> u32 {
        self.ignored
    }
}
