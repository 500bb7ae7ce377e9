#![cfg(test)]

// Property tests for DoubleHashTable kept inside the crate so they can
// inspect slot-level state through crate-private accessors.

use crate::double_hash_table::{DoubleHashTable, InsertError, NotFound, Slot};
use crate::record::{ContactFields, Record};
use proptest::prelude::*;
use std::collections::{BTreeMap, HashMap};

// Key-pool-indexed operations so shrinking moves toward earlier keys and
// shorter op lists.
#[derive(Clone, Debug)]
enum OpI {
    Insert(usize, u8),
    Find(usize),
    Update(usize, u8),
    Remove(usize),
    Iterate,
}

fn contact(key: i32, tag: u8) -> Record {
    Record::new(key, format!("n{}", tag), format!("e{}@x", tag), format!("{}", tag)).unwrap()
}

fn fields(tag: u8) -> ContactFields {
    ContactFields::new(format!("u{}", tag), format!("u{}@x", tag), format!("{}", tag)).unwrap()
}

// Prime capacities: every step is coprime to N, so a probe path covers the
// whole table and saturation happens exactly when the table is full.
fn arb_scenario() -> impl Strategy<Value = (usize, Vec<i32>, Vec<OpI>)> {
    (
        prop::sample::select(vec![2usize, 3, 5, 7, 11, 13]),
        proptest::collection::vec(-200i32..200, 1..=16),
    )
        .prop_flat_map(|(capacity, pool)| {
            let idx = 0..pool.len();
            let op = prop_oneof![
                3 => (idx.clone(), any::<u8>()).prop_map(|(i, t)| OpI::Insert(i, t)),
                2 => idx.clone().prop_map(OpI::Find),
                1 => (idx.clone(), any::<u8>()).prop_map(|(i, t)| OpI::Update(i, t)),
                2 => idx.clone().prop_map(OpI::Remove),
                1 => Just(OpI::Iterate),
            ];
            proptest::collection::vec(op, 1..80)
                .prop_map(move |ops| (capacity, pool.clone(), ops))
        })
}

// Property: State-machine equivalence against std::collections::HashMap.
// Invariants exercised across random operation sequences:
// - Duplicate keys are rejected; saturation happens iff every slot is occupied.
// - Every live key stays reachable by `find` after arbitrary removals.
// - `find` returns the exact stored record; `update` rewrites it in place.
// - The slot returned by `insert` is where `find` later reports the key.
// - `len` equals the number of occupied slots; `tombstones` the number of
//   tombstoned slots.
proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((capacity, pool, ops) in arb_scenario()) {
        let mut sut = DoubleHashTable::with_capacity(capacity).unwrap();
        let mut model: HashMap<i32, Record> = HashMap::new();
        let mut placed: HashMap<i32, usize> = HashMap::new();

        for op in ops {
            match op {
                OpI::Insert(i, tag) => {
                    let key = pool[i];
                    let record = contact(key, tag);
                    let already = model.contains_key(&key);
                    let full = model.len() == capacity;
                    match sut.insert(record.clone()) {
                        Ok(idx) => {
                            prop_assert!(!already, "insert must fail on duplicate");
                            prop_assert!(!full, "insert must fail when full");
                            model.insert(key, record);
                            placed.insert(key, idx);
                        }
                        Err(InsertError::DuplicateKey(r)) => {
                            prop_assert!(already, "duplicate error only when key exists");
                            prop_assert_eq!(r, record);
                        }
                        Err(InsertError::Saturated(r)) => {
                            prop_assert!(!already);
                            prop_assert!(full, "saturated only when every slot is occupied");
                            prop_assert_eq!(r, record);
                        }
                    }
                }
                OpI::Find(i) => {
                    let key = pool[i];
                    match (sut.find(key), model.get(&key)) {
                        (Some((idx, r)), Some(m)) => {
                            prop_assert_eq!(r, m);
                            prop_assert_eq!(Some(&idx), placed.get(&key));
                        }
                        (None, None) => {}
                        (s, m) => prop_assert!(false, "find mismatch: {:?} vs {:?}", s, m),
                    }
                }
                OpI::Update(i, tag) => {
                    let key = pool[i];
                    let res = sut.update(key, fields(tag));
                    match model.get_mut(&key) {
                        Some(m) => {
                            prop_assert_eq!(res.ok(), placed.get(&key).copied());
                            *m = Record::from_fields(key, fields(tag));
                        }
                        None => prop_assert_eq!(res, Err(NotFound { key })),
                    }
                }
                OpI::Remove(i) => {
                    let key = pool[i];
                    match model.remove(&key) {
                        Some(m) => {
                            prop_assert_eq!(sut.remove(key), Ok(m));
                            placed.remove(&key);
                        }
                        None => prop_assert_eq!(sut.remove(key), Err(NotFound { key })),
                    }
                }
                OpI::Iterate => {
                    let seen: BTreeMap<i32, usize> =
                        sut.iter().map(|(i, r)| (r.key(), i)).collect();
                    let expected: BTreeMap<i32, usize> =
                        placed.iter().map(|(&k, &i)| (k, i)).collect();
                    prop_assert_eq!(seen, expected);
                }
            }

            // Post-conditions after each op
            // 1) Every live key is reachable through its own probe path.
            for (key, m) in &model {
                prop_assert_eq!(sut.get(*key), Some(m));
            }
            // 2) Counters match slot states.
            let occupied = sut.slots().iter().filter(|s| matches!(s, Slot::Occupied(_))).count();
            let tombs = sut.slots().iter().filter(|s| matches!(s, Slot::Tombstone)).count();
            prop_assert_eq!(sut.len(), model.len());
            prop_assert_eq!(occupied, model.len());
            prop_assert_eq!(sut.tombstones(), tombs);
            // 3) Every collision report ends where the record lives.
            for report in sut.diagnose_collisions() {
                prop_assert_eq!(report.probed_indices.first(), Some(&report.home_index));
                prop_assert_eq!(report.probed_indices.last(), Some(&report.final_index));
            }
        }
    }
}

// Property: With a composite capacity some steps share a factor with N, so
// a key can see a shorter cycle. Insert still never places a record off its
// own path, and everything it places stays findable.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_composite_capacity_keeps_reachability(
        capacity in prop::sample::select(vec![4usize, 6, 8, 9, 10, 12]),
        keys in proptest::collection::vec(-500i32..500, 1..40),
        removals in proptest::collection::vec(any::<prop::sample::Index>(), 0..10),
    ) {
        let mut sut = DoubleHashTable::with_capacity(capacity).unwrap();
        let mut stored: Vec<i32> = Vec::new();
        for key in keys {
            match sut.insert(contact(key, 0)) {
                Ok(idx) => {
                    prop_assert!(sut.hasher().probe(key).any(|i| i == idx));
                    stored.push(key);
                }
                Err(InsertError::DuplicateKey(_)) => prop_assert!(stored.contains(&key)),
                Err(InsertError::Saturated(_)) => {
                    // Every slot the key can reach is occupied.
                    for i in sut.hasher().probe(key) {
                        prop_assert!(matches!(sut.slots()[i], Slot::Occupied(_)));
                    }
                }
            }
        }
        for ix in removals {
            if stored.is_empty() {
                break;
            }
            let key = stored.remove(ix.index(stored.len()));
            prop_assert!(sut.remove(key).is_ok());
        }
        for key in &stored {
            prop_assert!(sut.contains_key(*key));
        }
        prop_assert_eq!(sut.len(), stored.len());
    }
}
