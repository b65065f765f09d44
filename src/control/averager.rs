//! Altitude sample averaging.
//!
//! The sampling task pushes one raw ADC conversion per tick; the averaging
//! task reads a rounded mean of the last `N` samples. [`SharedAverager`] puts the
//! buffer behind a critical section so a read never sees a half-written buffer.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;

use crate::config::ALTITUDE_ADC_RANGE;

/// Fixed-capacity ring of raw samples. Unwritten slots count as zero.
#[derive(Debug, Clone)]
pub struct SampleAverager<const N: usize> {
    storage: [u32; N],
    write_index: usize,
    sample_count: u32,
}

impl<const N: usize> SampleAverager<N> {
    const NON_EMPTY: () = assert!(N > 0, "sample buffer needs at least one slot");

    pub const fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::NON_EMPTY;
        Self {
            storage: [0; N],
            write_index: 0,
            sample_count: 0,
        }
    }

    /// Overwrite the oldest slot.
    pub fn push(&mut self, raw: u32) {
        self.storage[self.write_index] = raw;
        self.write_index = (self.write_index + 1) % N;
        self.sample_count = self.sample_count.saturating_add(1);
    }

    /// True once the buffer has been filled at least once.
    pub fn is_primed(&self) -> bool {
        self.sample_count as usize >= N
    }

    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    /// Rounded mean: `(2 * sum + N) / (2 * N)`.
    pub fn read_average(&self) -> u32 {
        let sum: u64 = self.storage.iter().map(|&s| s as u64).sum();
        let n = N as u64;
        ((2 * sum + n) / (2 * n)) as u32
    }
}

impl<const N: usize> Default for SampleAverager<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// [`SampleAverager`] shared between the sampling task and the main loop.
pub struct SharedAverager<const N: usize> {
    inner: Mutex<CriticalSectionRawMutex, RefCell<SampleAverager<N>>>,
}

impl<const N: usize> SharedAverager<N> {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(SampleAverager::new())),
        }
    }

    pub fn push(&self, raw: u32) {
        self.inner.lock(|a| a.borrow_mut().push(raw));
    }

    /// Sums the whole buffer inside one critical section.
    pub fn read_average(&self) -> u32 {
        self.inner.lock(|a| a.borrow().read_average())
    }

    pub fn is_primed(&self) -> bool {
        self.inner.lock(|a| a.borrow().is_primed())
    }

    pub fn sample_count(&self) -> u32 {
        self.inner.lock(|a| a.borrow().sample_count())
    }
}

impl<const N: usize> Default for SharedAverager<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Converts averaged ADC readings to percent height above the ground level.
///
/// The sensor reads lower the higher the rig flies, so the sign is inverted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Altimeter {
    ground_level: i32,
    range: i32,
}

impl Altimeter {
    /// `ground_level` is the first primed average after power-up.
    pub fn new(ground_level: u32) -> Self {
        Self::with_range(ground_level, ALTITUDE_ADC_RANGE)
    }

    pub fn with_range(ground_level: u32, range: i32) -> Self {
        Self {
            ground_level: ground_level.min(i32::MAX as u32) as i32,
            range: if range == 0 { 1 } else { range },
        }
    }

    pub fn ground_level(&self) -> u32 {
        self.ground_level as u32
    }

    pub fn height_percent(&self, average: u32) -> i16 {
        let average = average.min(i32::MAX as u32) as i32;
        let delta = average.saturating_sub(self.ground_level);
        let percent = delta.saturating_mul(-100) / self.range;
        percent.clamp(i16::MIN as i32, i16::MAX as i32) as i16
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Filling the buffer with one value reads that value back.
    #[test]
    fn test_identical_samples_average() {
        let mut avg = SampleAverager::<10>::new();
        for _ in 0..10 {
            avg.push(2047);
        }
        assert!(avg.is_primed(), "Ten pushes should prime a ten-slot buffer.");
        assert_eq!(avg.read_average(), 2047);
    }

    /// The eleventh push evicts the first sample.
    #[test]
    fn test_oldest_sample_evicted() {
        let mut avg = SampleAverager::<10>::new();
        avg.push(1000);
        for _ in 0..9 {
            avg.push(0);
        }
        assert_eq!(avg.read_average(), 100);
        avg.push(0);
        assert_eq!(avg.read_average(), 0, "The 1000 sample should be gone.");
        assert_eq!(avg.sample_count(), 11);
    }

    /// The mean rounds to nearest rather than truncating.
    #[test]
    fn test_average_rounds_to_nearest() {
        let mut avg = SampleAverager::<4>::new();
        for s in [1, 1, 2, 2] {
            avg.push(s);
        }
        // 6 / 4 = 1.5 rounds up
        assert_eq!(avg.read_average(), 2);

        let mut avg = SampleAverager::<4>::new();
        for s in [1, 1, 1, 2] {
            avg.push(s);
        }
        // 5 / 4 = 1.25 rounds down
        assert_eq!(avg.read_average(), 1);
    }

    /// Priming needs a full buffer's worth of samples.
    #[test]
    fn test_priming() {
        let mut avg = SampleAverager::<3>::new();
        assert!(!avg.is_primed());
        avg.push(1);
        avg.push(1);
        assert!(!avg.is_primed(), "Two of three slots is not primed.");
        avg.push(1);
        assert!(avg.is_primed());
        assert_eq!(avg.capacity(), 3);
    }

    /// The shared wrapper behaves like the plain buffer.
    #[test]
    fn test_shared_averager() {
        static SHARED: SharedAverager<10> = SharedAverager::new();
        for i in 0..10 {
            SHARED.push(100 + i);
        }
        assert!(SHARED.is_primed());
        assert_eq!(SHARED.sample_count(), 10);
        // mean of 100..=109 is 104.5, rounds to 105
        assert_eq!(SHARED.read_average(), 105);
    }

    /// Readings below ground level map to positive height.
    #[test]
    fn test_altimeter_percent() {
        let alt = Altimeter::new(2500);
        assert_eq!(alt.height_percent(2500), 0);
        assert_eq!(alt.height_percent(1000), 100);
        assert_eq!(alt.height_percent(1750), 50);
        assert_eq!(alt.height_percent(2530), -2, "Above ground level reads negative.");
        assert_eq!(alt.ground_level(), 2500);
    }
}
