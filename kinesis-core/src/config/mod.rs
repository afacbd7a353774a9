//! Configuration types
//!
//! Board-agnostic tunables for the control path, the board-level settings
//! around it, and the line parser that reads both from kinesis.toml.

pub mod board;
pub mod parser;
pub mod types;

pub use board::{BoardConfig, TelemetryMode};
pub use parser::{parse_config, LineError, ParseError};
pub use types::*;
