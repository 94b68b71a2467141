//! # Sample buffers
//!
//! [`Buffer`] is a fixed-capacity container that fills sequentially and
//! refuses new samples once full. [`ReservoirBuffer`] keeps the same memory
//! bound but, once full, keeps a uniform random subset of everything it has
//! seen (Algorithm R).
//!
//! Both flush on `retrieve`, handing ownership of the samples to the caller.

mod reservoir;

pub use reservoir::ReservoirBuffer;

use crate::model::Sample;

/// A bounded sample buffer.
#[derive(Debug, Clone)]
pub struct Buffer<S> {
    samples: Vec<S>,
    capacity: usize,
}

impl<S: Sample> Buffer<S> {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a sample. Returns `false` when the buffer is full.
    pub fn put(&mut self, sample: S) -> bool {
        if self.remaining() > 0 {
            self.samples.push(sample);
            true
        } else {
            false
        }
    }

    /// Replace the sample at `index`. Only occupied slots can be replaced.
    pub fn set(&mut self, index: usize, sample: S) -> bool {
        match self.samples.get_mut(index) {
            Some(slot) => {
                *slot = sample;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, index: usize) -> Option<&S> {
        self.samples.get(index)
    }

    /// Free slots left.
    pub fn remaining(&self) -> usize {
        self.capacity - self.samples.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Take every buffered sample, leaving the buffer empty.
    pub fn retrieve(&mut self) -> Vec<S> {
        std::mem::replace(&mut self.samples, Vec::with_capacity(self.capacity))
    }

    /// Like [`retrieve`](Self::retrieve), sorted ascending by timestamp.
    /// Samples sharing a timestamp come back in unspecified order.
    pub fn retrieve_in_order(&mut self) -> Vec<S> {
        let mut samples = self.retrieve();
        samples.sort_unstable_by_key(|s| s.timestamp());
        samples
    }
}
