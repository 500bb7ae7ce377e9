//! double-hash-table: a fixed-capacity contact table using open addressing
//! with double hashing.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: a small associative store from an integer key to a contact
//!   record whose probe behavior is fully deterministic and inspectable.
//! - Layers:
//!   - DoubleHasher: computes the home slot `h1(key)` and the probe step
//!     `h2(key)` and yields the probe sequence `h1, h1+h2, h1+2*h2, ... mod N`.
//!   - DoubleHashTable: owns a boxed slice of `Empty | Tombstone |
//!     Occupied(Record)` slots and implements insert/find/update/remove by
//!     walking that sequence.
//!   - Diagnostics, bulk exchange and command dispatch are extra `impl`
//!     blocks on the table; they only read slots or call the core methods.
//!   - SharedTable: optional `Arc<Mutex<_>>` handle for multi-threaded use.
//!
//! Constraints
//! - Capacity is fixed at construction. No resizing, no rehashing.
//! - Every operation inspects at most N slots and always terminates.
//! - The table exclusively owns stored records; lookups return shared
//!   references tied to the table borrow, never aliases that outlive it.
//!
//! Probing and deletion
//! - `find`, `update` and `remove` stop at the first `Empty` slot on the
//!   probe path and walk past `Tombstone`s.
//! - `remove` leaves a `Tombstone`, so a key that probed past the removed
//!   slot at insertion time stays reachable. Slots go back to `Empty` only
//!   through `clear`, which `remove` also runs when it takes out the last
//!   record. Under heavy churn with a nonzero `len`, tombstones accumulate
//!   and misses walk up to N slots; `clear` is the reset.
//! - `insert` walks the path until an `Empty` slot (or N attempts) to make
//!   sure the key is absent, then reuses the first `Tombstone` it passed,
//!   or the `Empty` slot if there was none.
//!
//! Keys
//! - Keys are unique: inserting a key that is already stored fails with
//!   `InsertError::DuplicateKey` and returns the rejected record.
//! - Both hashes widen the key to `i64`; negative keys are reduced with a
//!   Euclidean remainder so they land in range.
//!
//! Saturation
//! - When no free slot exists on a key's path, `insert` returns
//!   `InsertError::Saturated` carrying the record; the table is unchanged.
//!   If the step shares a factor with N, the path covers fewer than N slots
//!   and saturation can happen before the table is full. Prime capacities
//!   avoid this.
//!
//! Notes and non-goals
//! - No internal synchronization. `SharedTable` adds one coarse lock per
//!   operation; there is no per-slot locking.
//! - No parsing or formatting of files or prompts; `exchange` and `command`
//!   define the boundary other code plugs into.

pub mod command;
pub mod config;
pub mod diagnostics;
pub mod double_hash_table;
mod double_hash_table_proptest;
pub mod exchange;
pub mod hashing;
pub mod record;
pub mod shared;

// Public surface
pub use command::{Command, Outcome};
pub use config::{ConfigError, TableConfig};
pub use diagnostics::{CollisionReport, CollisionStats, ProbeTrace};
pub use double_hash_table::{DoubleHashTable, InsertError, Iter, NotFound};
pub use exchange::{IterSource, LoadReport, RecordSink, RecordSource};
pub use hashing::{DoubleHasher, ProbeSeq};
pub use record::{key_from_name, ContactFields, Field, Record, RecordError};
pub use shared::SharedTable;
