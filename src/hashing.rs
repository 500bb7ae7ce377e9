//! Home-slot and step hashes, and the probe sequence they generate.
//!
//! Both hashes widen the key to `i64` before multiplying, so a 32-bit key
//! times a 32-bit multiplier never overflows. Reduction uses the Euclidean
//! remainder, which keeps negative keys inside `[0, N)`.

use crate::config::{
    ConfigError, TableConfig, DEFAULT_CAPACITY, DEFAULT_PRIMARY_MULTIPLIER, DEFAULT_STEP_MULTIPLIER,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DoubleHasher {
    capacity: usize,
    primary_multiplier: i64,
    step_multiplier: i64,
}

impl DoubleHasher {
    pub fn new(config: &TableConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            capacity: config.capacity,
            primary_multiplier: i64::from(config.primary_multiplier),
            step_multiplier: i64::from(config.step_multiplier),
        })
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// h1: the slot a key tries first, in `[0, N)`.
    #[inline]
    pub fn home(&self, key: i32) -> usize {
        let mixed = i64::from(key) * self.primary_multiplier;
        mixed.rem_euclid(self.capacity as i64) as usize
    }

    /// h2: the probe stride, in `[1, N-1]` (exactly 1 when `N == 1`).
    #[inline]
    pub fn step(&self, key: i32) -> usize {
        if self.capacity == 1 {
            return 1;
        }
        let mixed = i64::from(key) * self.step_multiplier + 1;
        mixed.rem_euclid(self.capacity as i64 - 1) as usize + 1
    }

    /// The full probe sequence for `key`: exactly `N` indices starting at
    /// `home(key)`. Indices repeat when the step and `N` share a factor.
    pub fn probe(&self, key: i32) -> ProbeSeq {
        ProbeSeq {
            next: self.home(key),
            step: self.step(key),
            capacity: self.capacity,
            remaining: self.capacity,
        }
    }
}

impl Default for DoubleHasher {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            primary_multiplier: i64::from(DEFAULT_PRIMARY_MULTIPLIER),
            step_multiplier: i64::from(DEFAULT_STEP_MULTIPLIER),
        }
    }
}

/// Iterator over the slot indices visited for one key.
#[derive(Debug, Clone)]
pub struct ProbeSeq {
    next: usize,
    step: usize,
    capacity: usize,
    remaining: usize,
}

impl Iterator for ProbeSeq {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<usize> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let idx = self.next;
        self.next = (idx + self.step) % self.capacity;
        Some(idx)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for ProbeSeq {}
