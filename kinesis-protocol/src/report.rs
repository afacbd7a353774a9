//! Diagnostic report lines sent from the board to the host
//!
//! Every report is one newline-terminated ASCII line. The loudness stream
//! is a bare integer per line so host-side visualisers can `parseInt` it
//! without knowing anything else about the protocol.

use core::fmt::Write;

use heapless::String;

use crate::command::Command;

/// Maximum encoded line length, newline included
pub const MAX_LINE_LEN: usize = 64;

/// An encoded report line
pub type ReportLine = String<MAX_LINE_LEN>;

/// Errors that can occur while encoding a report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReportError {
    /// Encoded text did not fit in [`MAX_LINE_LEN`]
    LineTooLong,
}

/// Reports emitted by the firmware
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Report<'a> {
    /// Supervisor entered a new state
    StateChange {
        /// Upper-case state name
        state: &'a str,
        /// Whether the new state holds the motor off
        motor_off: bool,
    },
    /// A fault was latched
    Fault {
        /// Human-readable reason (never empty)
        reason: &'a str,
    },
    /// Periodic status while the motor is being driven
    Status {
        state: &'a str,
        amplitude: u16,
        baseline: u16,
        drive: u16,
    },
    /// Bare loudness value for host visualisers
    Loudness(u16),
    /// Echo of an accepted operator command
    Ack(Command),
}

impl Report<'_> {
    /// Encode this report as a newline-terminated line
    pub fn encode(&self) -> Result<ReportLine, ReportError> {
        let mut line = ReportLine::new();
        self.write_to(&mut line).map_err(|_| ReportError::LineTooLong)?;
        line.push('\n').map_err(|_| ReportError::LineTooLong)?;
        Ok(line)
    }

    fn write_to(&self, out: &mut ReportLine) -> core::fmt::Result {
        match *self {
            Report::StateChange { state, motor_off } => {
                write!(out, "STATE: {}", state)?;
                if motor_off {
                    out.write_str(" (motor off)")?;
                }
                Ok(())
            }
            Report::Fault { reason } => write!(out, "FAULT: {}", reason),
            Report::Status {
                state,
                amplitude,
                baseline,
                drive,
            } => write!(
                out,
                "State={} Amp={} DC={} PWM={}",
                state, amplitude, baseline, drive
            ),
            Report::Loudness(amplitude) => write!(out, "{}", amplitude),
            Report::Ack(cmd) => write!(out, "CMD: {}", cmd.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_change_line() {
        let line = Report::StateChange {
            state: "IDLE",
            motor_off: true,
        }
        .encode()
        .unwrap();
        assert_eq!(line.as_str(), "STATE: IDLE (motor off)\n");

        let line = Report::StateChange {
            state: "ACTIVE",
            motor_off: false,
        }
        .encode()
        .unwrap();
        assert_eq!(line.as_str(), "STATE: ACTIVE\n");
    }

    #[test]
    fn test_fault_line() {
        let line = Report::Fault {
            reason: "sampling failed to start",
        }
        .encode()
        .unwrap();
        assert_eq!(line.as_str(), "FAULT: sampling failed to start\n");
    }

    #[test]
    fn test_status_line() {
        let line = Report::Status {
            state: "ACTIVE",
            amplitude: 42,
            baseline: 511,
            drive: 96,
        }
        .encode()
        .unwrap();
        assert_eq!(line.as_str(), "State=ACTIVE Amp=42 DC=511 PWM=96\n");
    }

    #[test]
    fn test_loudness_is_bare_integer() {
        let line = Report::Loudness(187).encode().unwrap();
        assert_eq!(line.as_str(), "187\n");
    }

    #[test]
    fn test_ack_line() {
        let line = Report::Ack(Command::Reset).encode().unwrap();
        assert_eq!(line.as_str(), "CMD: RESET\n");
    }

    #[test]
    fn test_overlong_reason_rejected() {
        let reason = "a reason that goes on and on and on and on and on and on and on";
        assert_eq!(
            Report::Fault { reason }.encode(),
            Err(ReportError::LineTooLong)
        );
    }
}
