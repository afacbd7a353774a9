//! Sample source trait
//!
//! Implemented by the read side of whatever the sampling interrupt writes
//! into. The control loop never writes through this trait.

/// Read access to an interrupt-fed rolling sample buffer of length `N`
pub trait SampleSource<const N: usize> {
    /// Monotonic (wrapping) count of samples taken since boot
    fn sample_count(&self) -> u32;

    /// Whether the sampling hardware reported a successful start
    fn latest_ok(&self) -> bool;

    /// Copy the current buffer contents into `out`
    ///
    /// The copy may interleave with interrupt writes, so `out` can mix
    /// samples from two adjacent ticks.
    fn snapshot(&self, out: &mut [u16; N]);
}
