//! DoubleHashTable: fixed-capacity open addressing keyed by contact key.

use crate::config::{ConfigError, TableConfig};
use crate::hashing::DoubleHasher;
use crate::record::{ContactFields, Record};
use thiserror::Error;
use tracing::{debug, warn};

/// One cell of the table. `Tombstone` marks a removed record: probing
/// walks past it, insertion may reuse it.
#[derive(Debug, Clone, Default)]
pub(crate) enum Slot {
    #[default]
    Empty,
    Tombstone,
    Occupied(Record),
}

impl Slot {
    #[inline]
    pub(crate) fn record(&self) -> Option<&Record> {
        match self {
            Slot::Occupied(r) => Some(r),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum InsertError {
    /// Every slot on the key's probe path is occupied.
    #[error("no free slot on the probe path of key {}", .0.key())]
    Saturated(Record),
    #[error("a record with key {} is already stored", .0.key())]
    DuplicateKey(Record),
}

impl InsertError {
    pub fn key(&self) -> i32 {
        self.record().key()
    }

    pub fn record(&self) -> &Record {
        match self {
            InsertError::Saturated(r) | InsertError::DuplicateKey(r) => r,
        }
    }

    /// Hands back the record that could not be stored.
    pub fn into_record(self) -> Record {
        match self {
            InsertError::Saturated(r) | InsertError::DuplicateKey(r) => r,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no record with key {key}")]
pub struct NotFound {
    pub key: i32,
}

pub struct DoubleHashTable {
    config: TableConfig,
    hasher: DoubleHasher,
    slots: Box<[Slot]>,
    len: usize,
    tombstones: usize,
}

impl DoubleHashTable {
    /// A table with the default capacity (75) and multipliers.
    pub fn new() -> Self {
        let config = TableConfig::default();
        Self {
            config,
            hasher: DoubleHasher::default(),
            slots: empty_slots(config.capacity),
            len: 0,
            tombstones: 0,
        }
    }

    pub fn with_config(config: TableConfig) -> Result<Self, ConfigError> {
        let hasher = DoubleHasher::new(&config)?;
        Ok(Self {
            config,
            hasher,
            slots: try_empty_slots(config.capacity)?,
            len: 0,
            tombstones: 0,
        })
    }

    pub fn with_capacity(capacity: usize) -> Result<Self, ConfigError> {
        Self::with_config(TableConfig::with_capacity(capacity))
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    pub(crate) fn hasher(&self) -> &DoubleHasher {
        &self.hasher
    }

    pub(crate) fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
    pub fn len(&self) -> usize {
        self.len
    }
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
    /// Slots freed by `remove` that have not been reused yet.
    pub fn tombstones(&self) -> usize {
        self.tombstones
    }

    pub fn load_factor(&self) -> f64 {
        self.len as f64 / self.capacity() as f64
    }

    /// Follows `key`'s probe sequence and returns the slot holding it.
    /// Stops at the first `Empty` slot; tombstones are walked past.
    fn locate(&self, key: i32) -> Option<usize> {
        for idx in self.hasher.probe(key) {
            match &self.slots[idx] {
                Slot::Empty => return None,
                Slot::Occupied(r) if r.key() == key => return Some(idx),
                Slot::Occupied(_) | Slot::Tombstone => {}
            }
        }
        None
    }

    /// Stores `record` on the first free slot of its probe path and returns
    /// that slot's index. The whole path up to the first `Empty` slot is
    /// checked for the key first, so a tombstone is only reused once the key
    /// is known to be absent. On error the table is unchanged.
    pub fn insert(&mut self, record: Record) -> Result<usize, InsertError> {
        let key = record.key();
        let mut reusable = None;
        let mut free = None;
        let mut attempts = 0usize;
        for idx in self.hasher.probe(key) {
            attempts += 1;
            match &self.slots[idx] {
                Slot::Empty => {
                    free = Some(idx);
                    break;
                }
                Slot::Tombstone => {
                    reusable.get_or_insert(idx);
                }
                Slot::Occupied(r) if r.key() == key => {
                    debug!(key, index = idx, "insert rejected: duplicate key");
                    return Err(InsertError::DuplicateKey(record));
                }
                Slot::Occupied(_) => {}
            }
        }

        let Some(idx) = reusable.or(free) else {
            warn!(key, attempts, capacity = self.capacity(), "insert saturated");
            return Err(InsertError::Saturated(record));
        };
        if matches!(self.slots[idx], Slot::Tombstone) {
            self.tombstones -= 1;
        }
        self.slots[idx] = Slot::Occupied(record);
        self.len += 1;
        debug!(key, index = idx, attempts, "inserted record");
        Ok(idx)
    }

    /// Slot index and read-only view of the record stored under `key`.
    pub fn find(&self, key: i32) -> Option<(usize, &Record)> {
        let idx = self.locate(key)?;
        self.slots[idx].record().map(|r| (idx, r))
    }

    pub fn get(&self, key: i32) -> Option<&Record> {
        self.find(key).map(|(_, r)| r)
    }

    pub fn contains_key(&self, key: i32) -> bool {
        self.locate(key).is_some()
    }

    /// Rewrites name, email and phone of the record under `key` in place.
    pub fn update(&mut self, key: i32, fields: ContactFields) -> Result<usize, NotFound> {
        let idx = self.locate(key).ok_or(NotFound { key })?;
        match &mut self.slots[idx] {
            Slot::Occupied(r) => {
                r.replace_fields(fields);
                debug!(key, index = idx, "updated record");
                Ok(idx)
            }
            _ => Err(NotFound { key }),
        }
    }

    /// Takes the record under `key` out of the table, leaving a tombstone so
    /// keys probed past this slot stay reachable. Removing the last record
    /// resets every slot to `Empty`.
    pub fn remove(&mut self, key: i32) -> Result<Record, NotFound> {
        let idx = self.locate(key).ok_or(NotFound { key })?;
        match core::mem::replace(&mut self.slots[idx], Slot::Tombstone) {
            Slot::Occupied(r) => {
                self.len -= 1;
                self.tombstones += 1;
                debug!(key, index = idx, "removed record");
                if self.len == 0 {
                    // Nothing left to keep reachable.
                    self.clear();
                }
                Ok(r)
            }
            other => {
                self.slots[idx] = other;
                Err(NotFound { key })
            }
        }
    }

    /// Drops every record and tombstone.
    pub fn clear(&mut self) {
        debug!(len = self.len, tombstones = self.tombstones, "clearing table");
        self.slots.iter_mut().for_each(|s| *s = Slot::Empty);
        self.len = 0;
        self.tombstones = 0;
    }

    /// Occupied slots in index order.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            it: self.slots.iter().enumerate(),
            remaining: self.len,
        }
    }
}

fn empty_slots(capacity: usize) -> Box<[Slot]> {
    (0..capacity).map(|_| Slot::Empty).collect()
}

// Allocation failure becomes an error instead of an abort.
fn try_empty_slots(capacity: usize) -> Result<Box<[Slot]>, ConfigError> {
    let mut slots = Vec::new();
    slots
        .try_reserve_exact(capacity)
        .map_err(|_| ConfigError::Allocation { capacity })?;
    slots.resize_with(capacity, || Slot::Empty);
    Ok(slots.into_boxed_slice())
}

impl Default for DoubleHashTable {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for DoubleHashTable {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DoubleHashTable")
            .field("capacity", &self.capacity())
            .field("len", &self.len)
            .field("tombstones", &self.tombstones)
            .finish()
    }
}

/// Iterator over `(slot index, record)` pairs of a `DoubleHashTable`.
pub struct Iter<'a> {
    it: core::iter::Enumerate<core::slice::Iter<'a, Slot>>,
    remaining: usize,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (usize, &'a Record);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        for (idx, slot) in self.it.by_ref() {
            if let Slot::Occupied(r) = slot {
                self.remaining -= 1;
                return Some((idx, r));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl<'a> IntoIterator for &'a DoubleHashTable {
    type Item = (usize, &'a Record);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
