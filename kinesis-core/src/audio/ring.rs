//! Interrupt-shared rolling sample buffer
//!
//! The ring is the only state shared between the sampling interrupt and
//! the control loop. Ownership is split once at boot:
//!
//! - [`SampleWriter`] is the interrupt's exclusive write role. It is not
//!   `Clone`, and [`SampleRing::split`] hands it out only once.
//! - [`SampleReader`] is the control loop's observer role. It is `Copy`
//!   and can only load.
//!
//! Every slot is an individual atomic, so a reader never sees a torn
//! sample, but a snapshot can mix samples from adjacent interrupt ticks.
//! The extractor averages the whole buffer, so such a mix shifts the mean
//! by at most one sample's worth and is gone on the next snapshot.
//!
//! The sample counter is published with `Release` after the slot store; a
//! reader that observes count `n` (with `Acquire`) also observes sample `n`.
//!
//! ```ignore
//! static SAMPLES: SampleRing<20> = SampleRing::new();
//!
//! let (mut writer, reader) = SAMPLES.split(1023).unwrap();
//! writer.prime(512);
//!
//! // In the sampling interrupt:
//! writer.push(adc.read());
//! ```

use portable_atomic::{AtomicBool, AtomicU16, AtomicU32, Ordering};

use crate::traits::SampleSource;

/// Fixed-capacity ring of the `N` most recent raw samples
pub struct SampleRing<const N: usize> {
    slots: [AtomicU16; N],
    count: AtomicU32,
    latest: AtomicU16,
    started: AtomicBool,
    claimed: AtomicBool,
}

impl<const N: usize> Default for SampleRing<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> SampleRing<N> {
    /// Create an empty ring (all slots zero)
    ///
    /// `const` so the ring can be a `static` shared with an interrupt.
    pub const fn new() -> Self {
        assert!(N > 0, "sample ring needs at least one slot");
        Self {
            slots: [const { AtomicU16::new(0) }; N],
            count: AtomicU32::new(0),
            latest: AtomicU16::new(0),
            started: AtomicBool::new(false),
            claimed: AtomicBool::new(false),
        }
    }

    /// Number of slots
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Split into the writer and reader roles
    ///
    /// Returns `None` if the ring was already split. Samples pushed through
    /// the writer are clamped to `adc_max`.
    pub fn split(&self, adc_max: u16) -> Option<(SampleWriter<'_, N>, SampleReader<'_, N>)> {
        if self.claimed.swap(true, Ordering::AcqRel) {
            return None;
        }

        let writer = SampleWriter {
            ring: self,
            index: 0,
            adc_max,
        };
        Some((writer, SampleReader { ring: self }))
    }
}

/// Exclusive write role, owned by the sampling interrupt
pub struct SampleWriter<'a, const N: usize> {
    ring: &'a SampleRing<N>,
    /// Next slot to overwrite; private to the writer
    index: usize,
    adc_max: u16,
}

impl<const N: usize> SampleWriter<'_, N> {
    /// Fill every slot with `value`
    ///
    /// Used at boot (before sampling starts) to seed the buffer with the
    /// silence baseline. Does not advance the sample counter.
    pub fn prime(&mut self, value: u16) {
        let value = value.min(self.adc_max);
        for slot in &self.ring.slots {
            slot.store(value, Ordering::Relaxed);
        }
        self.ring.latest.store(value, Ordering::Relaxed);
        self.index = 0;
    }

    /// Record one raw sample
    pub fn push(&mut self, raw: u16) {
        let sample = raw.min(self.adc_max);

        self.ring.slots[self.index].store(sample, Ordering::Relaxed);
        self.index = (self.index + 1) % N;
        self.ring.latest.store(sample, Ordering::Relaxed);

        // Single writer: a plain load/store pair is enough and avoids an
        // RMW, which Cortex-M0+ does not have.
        let count = self.ring.count.load(Ordering::Relaxed);
        self.ring.count.store(count.wrapping_add(1), Ordering::Release);
    }

    /// Report that the sampling hardware started successfully
    pub fn mark_started(&mut self) {
        self.ring.started.store(true, Ordering::Release);
    }

    /// Slot the next sample will be written to
    pub fn index(&self) -> usize {
        self.index
    }
}

/// Shared read role, owned by the control loop
#[derive(Clone, Copy)]
pub struct SampleReader<'a, const N: usize> {
    ring: &'a SampleRing<N>,
}

impl<const N: usize> SampleReader<'_, N> {
    /// Most recently pushed (or primed) sample
    pub fn latest(&self) -> u16 {
        self.ring.latest.load(Ordering::Relaxed)
    }
}

impl<const N: usize> SampleSource<N> for SampleReader<'_, N> {
    fn sample_count(&self) -> u32 {
        self.ring.count.load(Ordering::Acquire)
    }

    fn latest_ok(&self) -> bool {
        self.ring.started.load(Ordering::Acquire)
    }

    fn snapshot(&self, out: &mut [u16; N]) {
        for (dst, slot) in out.iter_mut().zip(self.ring.slots.iter()) {
            *dst = slot.load(Ordering::Relaxed);
        }
    }
}
