//! Serial protocol for the Kinesis sculpture
//!
//! The sculpture talks to a host over a plain UART (9600 baud by default). Traffic
//! is deliberately human-typeable in one direction and human-readable in
//! the other:
//!
//! ```text
//! host  -> board : single command bytes   's' | 'w' | 'r' (any case)
//! board -> host  : ASCII report lines     "STATE: ACTIVE\n"
//! ```
//!
//! There is no framing, checksum or sequence number. A lost command byte is
//! recovered by typing it again, and a lost report line is superseded by the
//! next state change.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod command;
pub mod report;

pub use command::{Command, CommandDecoder};
pub use report::{Report, ReportError, ReportLine, MAX_LINE_LEN};
