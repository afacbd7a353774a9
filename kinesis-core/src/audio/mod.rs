//! Audio sampling and amplitude extraction
//!
//! The sampling interrupt writes raw ADC readings into a [`SampleRing`];
//! the control loop snapshots it and reduces the snapshot to a single
//! smoothed amplitude with an [`AmplitudeExtractor`].

pub mod extractor;
pub mod ring;

pub use extractor::AmplitudeExtractor;
pub use ring::{SampleReader, SampleRing, SampleWriter};
