//! Motion mapping
//!
//! Turns a loudness value into a motor drive level, and limits how fast
//! that level may change.

pub mod mapper;
pub mod slew;

pub use mapper::MotionMapper;
pub use slew::SlewLimiter;
