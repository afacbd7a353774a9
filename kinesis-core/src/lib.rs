//! Board-agnostic core logic for the Kinesis audio-reactive motor controller
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Hardware abstraction traits (sample source, motor, watchdog, commands)
//! - Interrupt-shared sample ring and amplitude extraction
//! - Amplitude to drive mapping with slew limiting
//! - Supervisor state machine with liveness and fault latching
//! - Control loop composition
//! - Configuration types and the kinesis.toml line parser

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod audio;
pub mod config;
pub mod control;
pub mod motion;
pub mod safety;
pub mod state;
pub mod supervisor;
pub mod traits;

pub use kinesis_protocol::Command;
