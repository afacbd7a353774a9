//! Amplitude extraction
//!
//! Turns a snapshot of the rolling buffer into a single loudness value:
//!
//! 1. `mean` = truncating integer mean of the snapshot
//! 2. if auto-calibration is on: `baseline = (baseline * 99 + mean) / 100`
//! 3. `raw` = `|mean - baseline|`
//! 4. `smoothed = (smoothed * 3 + raw * 7) / 10`
//!
//! The weightings are fixed. Changing them changes every threshold's
//! meaning, so they are constants rather than configuration.
//!
//! With integer truncation, a constant `raw` drives `smoothed` to `raw - 1`
//! from below and to `raw` from above; both are fixed points.

use crate::traits::SampleSource;

/// Baseline filter: parts of the old estimate retained
pub const BASELINE_RETAIN: u32 = 99;
/// Baseline filter: denominator
pub const BASELINE_DIVISOR: u32 = 100;

/// Amplitude smoothing: weight of the previous value
pub const SMOOTHING_OLD: u32 = 3;
/// Amplitude smoothing: weight of the new magnitude
pub const SMOOTHING_NEW: u32 = 7;
/// Amplitude smoothing: denominator
pub const SMOOTHING_DIVISOR: u32 = 10;

/// DC-offset corrected, smoothed loudness from an `N`-sample buffer
#[derive(Debug, Clone)]
pub struct AmplitudeExtractor<const N: usize> {
    /// Private copy of the shared buffer
    snapshot: [u16; N],
    /// Configured silence level, used on reset
    silence_baseline: u16,
    /// Current DC offset estimate
    baseline: u16,
    /// Output of the last extraction
    smoothed: u16,
    /// Mean of the last extraction
    last_mean: u16,
    /// Whether the baseline may adapt
    auto_calibration: bool,
}

impl<const N: usize> AmplitudeExtractor<N> {
    /// Create an extractor in its reset state
    pub fn new(silence_baseline: u16) -> Self {
        Self {
            snapshot: [silence_baseline; N],
            silence_baseline,
            baseline: silence_baseline,
            smoothed: 0,
            last_mean: silence_baseline,
            auto_calibration: true,
        }
    }

    /// Return to the power-on state
    ///
    /// Fills the snapshot with the silence baseline, zeros the amplitude,
    /// resets the baseline estimate and enables auto-calibration.
    pub fn reset(&mut self) {
        self.snapshot = [self.silence_baseline; N];
        self.baseline = self.silence_baseline;
        self.smoothed = 0;
        self.last_mean = self.silence_baseline;
        self.auto_calibration = true;
    }

    /// Replace the snapshot with a copy of the shared buffer
    pub fn capture<S: SampleSource<N>>(&mut self, source: &S) {
        source.snapshot(&mut self.snapshot);
    }

    /// Replace the snapshot with explicit samples
    pub fn load(&mut self, samples: &[u16; N]) {
        self.snapshot = *samples;
    }

    /// Fill the snapshot with a single value
    pub fn fill(&mut self, value: u16) {
        self.snapshot = [value; N];
    }

    /// Compute the smoothed amplitude of the current snapshot
    pub fn extract(&mut self) -> u16 {
        let sum: u32 = self.snapshot.iter().map(|&s| s as u32).sum();
        let mean = (sum / N as u32) as u16;
        self.last_mean = mean;

        if self.auto_calibration {
            let blended = self.baseline as u32 * BASELINE_RETAIN + mean as u32;
            self.baseline = (blended / BASELINE_DIVISOR) as u16;
        }

        let raw = mean.abs_diff(self.baseline) as u32;
        let smoothed = (self.smoothed as u32 * SMOOTHING_OLD + raw * SMOOTHING_NEW)
            / SMOOTHING_DIVISOR;
        self.smoothed = smoothed as u16;

        self.smoothed
    }

    /// Capture from `source` and extract in one step
    pub fn update<S: SampleSource<N>>(&mut self, source: &S) -> u16 {
        self.capture(source);
        self.extract()
    }

    /// Allow or freeze baseline adaptation
    pub fn set_auto_calibration(&mut self, enabled: bool) {
        self.auto_calibration = enabled;
    }

    /// Whether the baseline is currently adapting
    pub fn auto_calibration(&self) -> bool {
        self.auto_calibration
    }

    /// Current DC offset estimate
    pub fn baseline(&self) -> u16 {
        self.baseline
    }

    /// Amplitude returned by the last extraction
    pub fn smoothed(&self) -> u16 {
        self.smoothed
    }

    /// Buffer mean seen by the last extraction
    pub fn last_mean(&self) -> u16 {
        self.last_mean
    }
}
