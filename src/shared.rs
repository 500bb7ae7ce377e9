//! SharedTable: a cloneable handle that serializes every operation behind
//! one mutex.
//!
//! Locking is per operation and covers the whole table. Accessors that
//! would hand out references return clones instead, so no view outlives
//! the lock.

use crate::command::{Command, Outcome};
use crate::config::{ConfigError, TableConfig};
use crate::diagnostics::CollisionReport;
use crate::double_hash_table::{DoubleHashTable, InsertError, NotFound};
use crate::record::{ContactFields, Record};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Clone, Debug, Default)]
pub struct SharedTable {
    inner: Arc<Mutex<DoubleHashTable>>,
}

impl SharedTable {
    pub fn new(table: DoubleHashTable) -> Self {
        Self {
            inner: Arc::new(Mutex::new(table)),
        }
    }

    pub fn with_config(config: TableConfig) -> Result<Self, ConfigError> {
        DoubleHashTable::with_config(config).map(Self::new)
    }

    // Every operation either completes or leaves the table untouched, so a
    // poisoned lock still guards a consistent table.
    fn lock(&self) -> MutexGuard<'_, DoubleHashTable> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Runs `f` with exclusive access for compound operations.
    pub fn with<R>(&self, f: impl FnOnce(&mut DoubleHashTable) -> R) -> R {
        f(&mut self.lock())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
    pub fn capacity(&self) -> usize {
        self.lock().capacity()
    }

    pub fn insert(&self, record: Record) -> Result<usize, InsertError> {
        self.lock().insert(record)
    }

    pub fn find(&self, key: i32) -> Option<(usize, Record)> {
        self.lock().find(key).map(|(i, r)| (i, r.clone()))
    }

    pub fn update(&self, key: i32, fields: ContactFields) -> Result<usize, NotFound> {
        self.lock().update(key, fields)
    }

    pub fn remove(&self, key: i32) -> Result<Record, NotFound> {
        self.lock().remove(key)
    }

    pub fn diagnose_collisions(&self) -> Vec<CollisionReport> {
        self.lock().diagnose_collisions()
    }

    pub fn snapshot(&self) -> Vec<(usize, Record)> {
        self.lock().iter().map(|(i, r)| (i, r.clone())).collect()
    }

    pub fn apply(&self, command: Command) -> Outcome {
        self.lock().apply(command)
    }
}

impl From<DoubleHashTable> for SharedTable {
    fn from(table: DoubleHashTable) -> Self {
        Self::new(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn clones_share_one_table() {
        let a = SharedTable::default();
        let b = a.clone();
        a.insert(Record::new(1, "A", "a@x", "1").unwrap()).unwrap();
        assert_eq!(b.find(1).map(|(_, r)| r.name().to_string()), Some("A".into()));
        assert_eq!(b.remove(1).map(|r| r.key()), Ok(1));
        assert!(a.is_empty());
    }

    /// Concurrent writers on distinct keys all land; nothing is lost.
    #[test]
    fn concurrent_inserts_are_serialized() {
        let t = SharedTable::with_config(TableConfig::with_capacity(101)).unwrap();
        let handles: Vec<_> = (0..4)
            .map(|w| {
                let t = t.clone();
                thread::spawn(move || {
                    for i in 0..20 {
                        let key = w * 100 + i;
                        t.insert(Record::new(key, "n", "e", "p").unwrap()).unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(t.len(), 80);
        assert_eq!(t.capacity(), 101);
        for w in 0..4 {
            for i in 0..20 {
                assert!(t.find(w * 100 + i).is_some());
            }
        }
    }

    #[test]
    fn poisoned_lock_is_recovered() {
        let t = SharedTable::default();
        t.insert(Record::new(7, "A", "a@x", "1").unwrap()).unwrap();
        let t2 = t.clone();
        let _ = thread::spawn(move || {
            let _: () = t2.with(|_| panic!("boom"));
        })
        .join();
        assert_eq!(t.find(7).map(|(_, r)| r.key()), Some(7));
        assert_eq!(t.snapshot().len(), 1);
    }

    #[test]
    fn apply_and_update_through_handle() {
        let t = SharedTable::default();
        let out = t.apply(Command::Insert(Record::new(5, "Ana", "a@x", "1").unwrap()));
        assert!(out.is_success());
        let fields = ContactFields::new("Ana B", "a@x", "2").unwrap();
        assert_eq!(t.update(5, fields), Ok(5));
        assert!(t.diagnose_collisions().is_empty());
    }
}
