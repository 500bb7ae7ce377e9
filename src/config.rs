//! Table configuration: capacity and the two hash multipliers.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Slot count used when no capacity is given.
pub const DEFAULT_CAPACITY: usize = 75;
/// Multiplier for the home-slot hash (Fibonacci-hashing style constant).
pub const DEFAULT_PRIMARY_MULTIPLIER: u32 = 2_654_435_761;
/// Multiplier for the step hash.
pub const DEFAULT_STEP_MULTIPLIER: u32 = 31_415;
/// Largest accepted capacity. Keys are `i32`, so more slots than that
/// cannot be told apart.
pub const MAX_CAPACITY: usize = i32::MAX as usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Number of slots. Fixed for the lifetime of the table.
    pub capacity: usize,
    pub primary_multiplier: u32,
    pub step_multiplier: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("table capacity must be at least 1")]
    ZeroCapacity,
    #[error("table capacity {requested} exceeds the maximum of {max}")]
    CapacityTooLarge { requested: usize, max: usize },
    #[error("could not allocate {capacity} slots")]
    Allocation { capacity: usize },
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            primary_multiplier: DEFAULT_PRIMARY_MULTIPLIER,
            step_multiplier: DEFAULT_STEP_MULTIPLIER,
        }
    }
}

impl TableConfig {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if self.capacity > MAX_CAPACITY {
            return Err(ConfigError::CapacityTooLarge {
                requested: self.capacity,
                max: MAX_CAPACITY,
            });
        }
        Ok(())
    }
}
