//! Collision diagnostics reconstructed from the current table contents.
//!
//! Paths are recomputed from each key's probe sequence rather than recorded
//! at insertion time. Because removal leaves tombstones, a reconstructed
//! path always ends at the slot that actually holds the record.

use crate::double_hash_table::{DoubleHashTable, Slot};
use serde::Serialize;
use tracing::trace;

/// A record that did not land on its home slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollisionReport {
    pub key: i32,
    pub home_index: usize,
    pub final_index: usize,
    /// Slots visited from `home_index` up to and including `final_index`.
    pub probed_indices: Vec<usize>,
}

impl CollisionReport {
    /// Number of occupied or tombstoned slots skipped before landing.
    pub fn displacement(&self) -> usize {
        self.probed_indices.len().saturating_sub(1)
    }
}

impl core::fmt::Display for CollisionReport {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "key {} collided at slot {}, settled at slot {}; probed:",
            self.key, self.home_index, self.final_index
        )?;
        for idx in &self.probed_indices {
            write!(f, " {}", idx)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CollisionStats {
    pub occupied: usize,
    pub collided: usize,
    pub longest_path: usize,
}

/// The walk a lookup for one key takes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeTrace {
    pub key: i32,
    /// Every slot inspected, in order.
    pub visited: Vec<usize>,
    /// Slot holding the key, if the walk found it.
    pub found: Option<usize>,
}

impl DoubleHashTable {
    /// One report per occupied slot whose record is not at its home index,
    /// in slot order.
    pub fn diagnose_collisions(&self) -> Vec<CollisionReport> {
        let reports: Vec<CollisionReport> = self
            .iter()
            .filter_map(|(idx, record)| self.collision_for(record.key(), idx))
            .collect();
        trace!(collisions = reports.len(), "diagnosed collisions");
        reports
    }

    fn collision_for(&self, key: i32, final_index: usize) -> Option<CollisionReport> {
        let home_index = self.hasher().home(key);
        if home_index == final_index {
            return None;
        }
        let mut probed_indices = Vec::new();
        for idx in self.hasher().probe(key) {
            probed_indices.push(idx);
            if idx == final_index {
                break;
            }
        }
        Some(CollisionReport {
            key,
            home_index,
            final_index,
            probed_indices,
        })
    }

    pub fn collision_stats(&self) -> CollisionStats {
        let reports = self.diagnose_collisions();
        CollisionStats {
            occupied: self.len(),
            collided: reports.len(),
            longest_path: reports
                .iter()
                .map(|r| r.probed_indices.len())
                .max()
                .unwrap_or(usize::from(!self.is_empty())),
        }
    }

    /// Replays the lookup for `key`: the slots it inspects and where it stops.
    pub fn probe_trace(&self, key: i32) -> ProbeTrace {
        let mut visited = Vec::new();
        let mut found = None;
        for idx in self.hasher().probe(key) {
            visited.push(idx);
            match &self.slots()[idx] {
                Slot::Empty => break,
                Slot::Occupied(r) if r.key() == key => {
                    found = Some(idx);
                    break;
                }
                Slot::Occupied(_) | Slot::Tombstone => {}
            }
        }
        ProbeTrace {
            key,
            visited,
            found,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Record;

    fn contact(key: i32) -> Record {
        Record::new(key, format!("c{}", key), "c@example.com", "1").unwrap()
    }

    #[test]
    fn no_collisions_on_home_slots() {
        let mut t = DoubleHashTable::new();
        t.insert(contact(5)).unwrap();
        t.insert(contact(6)).unwrap();
        assert!(t.diagnose_collisions().is_empty());
        assert_eq!(
            t.collision_stats(),
            CollisionStats {
                occupied: 2,
                collided: 0,
                longest_path: 1
            }
        );
    }

    #[test]
    fn reports_colliding_key_with_path() {
        let mut t = DoubleHashTable::new();
        t.insert(contact(5)).unwrap();
        t.insert(contact(80)).unwrap();
        let reports = t.diagnose_collisions();
        assert_eq!(
            reports,
            vec![CollisionReport {
                key: 80,
                home_index: 5,
                final_index: 19,
                probed_indices: vec![5, 19],
            }]
        );
        assert_eq!(reports[0].displacement(), 1);
        assert_eq!(
            reports[0].to_string(),
            "key 80 collided at slot 5, settled at slot 19; probed: 5 19"
        );
    }

    /// Removing the record at the home slot does not change the reported path.
    #[test]
    fn path_survives_removal_of_blocker() {
        let mut t = DoubleHashTable::new();
        t.insert(contact(5)).unwrap();
        t.insert(contact(80)).unwrap();
        t.remove(5).unwrap();
        let reports = t.diagnose_collisions();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].probed_indices, vec![5, 19]);
    }

    #[test]
    fn probe_trace_hit_and_miss() {
        let mut t = DoubleHashTable::new();
        t.insert(contact(5)).unwrap();
        t.insert(contact(80)).unwrap();

        let hit = t.probe_trace(80);
        assert_eq!(hit.visited, vec![5, 19]);
        assert_eq!(hit.found, Some(19));

        // 155 shares the home slot and would go to 58 next, which is empty.
        let miss = t.probe_trace(155);
        assert_eq!(miss.visited, vec![5, 58]);
        assert_eq!(miss.found, None);

        let empty = DoubleHashTable::new().probe_trace(42);
        assert_eq!(empty.visited.len(), 1);
        assert_eq!(empty.found, None);
    }

    #[test]
    fn empty_table_stats() {
        assert_eq!(DoubleHashTable::new().collision_stats(), CollisionStats::default());
    }
}
