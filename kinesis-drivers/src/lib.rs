//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in kinesis-core:
//!
//! - Motor drivers (PWM duty cycle over `embedded-hal`)

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod motor;
