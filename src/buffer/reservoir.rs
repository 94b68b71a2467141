use rand::rngs::ThreadRng;
use rand::Rng;

use super::Buffer;
use crate::model::Sample;

/// Fixed-capacity buffer with reservoir sampling (Algorithm R).
///
/// The first `capacity` samples fill the buffer in order. After that the
/// n-th sample seen since the last flush replaces a uniformly chosen slot
/// with probability `capacity / n`, so every sample seen so far has the same
/// chance of being in the buffer.
#[derive(Debug, Clone)]
pub struct ReservoirBuffer<S, R = ThreadRng> {
    buffer: Buffer<S>,
    /// Samples seen since the last flush. Starts at `capacity`.
    sampling_index: usize,
    rng: R,
}

impl<S: Sample> ReservoirBuffer<S, ThreadRng> {
    pub fn new(capacity: usize) -> Self {
        Self::with_rng(capacity, rand::thread_rng())
    }
}

impl<S: Sample, R: Rng> ReservoirBuffer<S, R> {
    /// Build a reservoir drawing from the given generator.
    pub fn with_rng(capacity: usize, rng: R) -> Self {
        Self {
            buffer: Buffer::new(capacity),
            sampling_index: capacity,
            rng,
        }
    }

    /// Offer a sample. Returns `true` if it was stored.
    pub fn put(&mut self, sample: S) -> bool {
        if self.buffer.remaining() > 0 {
            return self.buffer.put(sample);
        }
        if self.buffer.capacity() == 0 {
            return false;
        }
        // j over [0, seen] so the new sample survives with p = capacity / (seen + 1)
        let j = self.rng.gen_range(0..=self.sampling_index);
        self.sampling_index += 1;
        if j < self.buffer.capacity() {
            self.buffer.set(j, sample)
        } else {
            false
        }
    }

    pub fn set(&mut self, index: usize, sample: S) -> bool {
        self.buffer.set(index, sample)
    }

    pub fn get(&self, index: usize) -> Option<&S> {
        self.buffer.get(index)
    }

    pub fn remaining(&self) -> usize {
        self.buffer.remaining()
    }

    pub fn capacity(&self) -> usize {
        self.buffer.capacity()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Samples offered since the last flush, never less than `capacity`.
    pub fn sampling_index(&self) -> usize {
        self.sampling_index
    }

    /// Flush and restart the reservoir for the next window.
    pub fn retrieve(&mut self) -> Vec<S> {
        let samples = self.buffer.retrieve();
        self.sampling_index = self.buffer.capacity();
        samples
    }

    pub fn retrieve_in_order(&mut self) -> Vec<S> {
        let mut samples = self.retrieve();
        samples.sort_unstable_by_key(|s| s.timestamp());
        samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Metric;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn seeded(capacity: usize) -> ReservoirBuffer<Metric, StdRng> {
        ReservoirBuffer::with_rng(capacity, StdRng::seed_from_u64(7))
    }

    #[test]
    fn test_fills_sequentially_before_sampling() {
        let mut r = seeded(3);
        for i in 0..3 {
            assert!(r.put(Metric::num_plays(i as f64)));
        }
        assert_eq!(r.get(2).map(|m| m.value()), Some(2.0));
        assert_eq!(r.sampling_index(), 3);
    }

    #[test]
    fn test_sampling_index_counts_overflow() {
        let mut r = seeded(2);
        for i in 0..10 {
            r.put(Metric::num_plays(i as f64));
        }
        assert_eq!(r.len(), 2);
        assert_eq!(r.sampling_index(), 10);
    }

    #[test]
    fn test_retrieve_resets_sampling_index() {
        let mut r = seeded(2);
        for i in 0..6 {
            r.put(Metric::num_plays(i as f64));
        }
        assert_eq!(r.retrieve().len(), 2);
        assert_eq!(r.sampling_index(), 2);
        assert_eq!(r.remaining(), 2);
    }

    #[test]
    fn test_zero_capacity_never_stores() {
        let mut r = seeded(0);
        assert!(!r.put(Metric::num_plays(1.0)));
        assert!(!r.put(Metric::num_plays(2.0)));
        assert!(r.retrieve().is_empty());
    }

    #[test]
    fn test_late_samples_can_replace_slots() {
        let mut r = seeded(1);
        let stored = (0..200).filter(|i| r.put(Metric::num_plays(*i as f64))).count();
        // first put always stores; with 200 draws some replacements must land
        assert!(stored > 1);
    }
}
