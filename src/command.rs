//! Dispatcher boundary: one `Command` in, one `Outcome` out.
//!
//! A front end (menu loop, RPC handler, script) turns user input into a
//! `Command` and renders the returned `Outcome` with `Display`. Nothing
//! here reads or prints.

use crate::diagnostics::CollisionReport;
use crate::double_hash_table::{DoubleHashTable, InsertError};
use crate::record::{ContactFields, Record};
use core::fmt;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Insert(Record),
    Find(i32),
    Update(i32, ContactFields),
    Delete(i32),
    Diagnose,
    List,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Outcome {
    Inserted { key: i32, index: usize },
    Found { index: usize, record: Record },
    Updated { key: i32, index: usize },
    Deleted(Record),
    Saturated(Record),
    DuplicateKey(Record),
    NotFound(i32),
    Collisions(Vec<CollisionReport>),
    Listing(Vec<(usize, Record)>),
}

impl Outcome {
    /// Whether the command did what it asked for.
    pub fn is_success(&self) -> bool {
        !matches!(
            self,
            Outcome::Saturated(_) | Outcome::DuplicateKey(_) | Outcome::NotFound(_)
        )
    }
}

impl DoubleHashTable {
    pub fn apply(&mut self, command: Command) -> Outcome {
        match command {
            Command::Insert(record) => {
                let key = record.key();
                match self.insert(record) {
                    Ok(index) => Outcome::Inserted { key, index },
                    Err(InsertError::Saturated(r)) => Outcome::Saturated(r),
                    Err(InsertError::DuplicateKey(r)) => Outcome::DuplicateKey(r),
                }
            }
            Command::Find(key) => match self.find(key) {
                Some((index, record)) => Outcome::Found {
                    index,
                    record: record.clone(),
                },
                None => Outcome::NotFound(key),
            },
            Command::Update(key, fields) => match self.update(key, fields) {
                Ok(index) => Outcome::Updated { key, index },
                Err(e) => Outcome::NotFound(e.key),
            },
            Command::Delete(key) => match self.remove(key) {
                Ok(record) => Outcome::Deleted(record),
                Err(e) => Outcome::NotFound(e.key),
            },
            Command::Diagnose => Outcome::Collisions(self.diagnose_collisions()),
            Command::List => Outcome::Listing(
                self.iter().map(|(i, r)| (i, r.clone())).collect(),
            ),
        }
    }
}

fn write_record(f: &mut fmt::Formatter<'_>, r: &Record) -> fmt::Result {
    write!(
        f,
        "key {}: {} <{}> {}",
        r.key(),
        r.name(),
        r.email(),
        r.phone()
    )
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Inserted { key, index } => {
                write!(f, "contact {} stored in slot {}", key, index)
            }
            Outcome::Found { index, record } => {
                write!(f, "slot {}: ", index)?;
                write_record(f, record)
            }
            Outcome::Updated { key, index } => {
                write!(f, "contact {} updated in slot {}", key, index)
            }
            Outcome::Deleted(r) => write!(f, "contact {} deleted", r.key()),
            Outcome::Saturated(r) => write!(
                f,
                "no free slot for contact {}: probe attempts exhausted",
                r.key()
            ),
            Outcome::DuplicateKey(r) => {
                write!(f, "contact {} already exists", r.key())
            }
            Outcome::NotFound(key) => write!(f, "contact {} not found", key),
            Outcome::Collisions(reports) if reports.is_empty() => {
                f.write_str("no collisions")
            }
            Outcome::Collisions(reports) => {
                for (n, report) in reports.iter().enumerate() {
                    if n > 0 {
                        f.write_str("\n")?;
                    }
                    write!(f, "{}", report)?;
                }
                Ok(())
            }
            Outcome::Listing(items) if items.is_empty() => f.write_str("no contacts"),
            Outcome::Listing(items) => {
                for (n, (index, record)) in items.iter().enumerate() {
                    if n > 0 {
                        f.write_str("\n")?;
                    }
                    write!(f, "slot {}: ", index)?;
                    write_record(f, record)?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ana() -> Record {
        Record::new(5, "Ana", "ana@example.com", "555-0101").unwrap()
    }

    #[test]
    fn insert_find_delete_cycle() {
        let mut t = DoubleHashTable::new();
        let out = t.apply(Command::Insert(ana()));
        assert_eq!(out, Outcome::Inserted { key: 5, index: 5 });
        assert_eq!(out.to_string(), "contact 5 stored in slot 5");

        let out = t.apply(Command::Find(5));
        assert_eq!(
            out.to_string(),
            "slot 5: key 5: Ana <ana@example.com> 555-0101"
        );

        let out = t.apply(Command::Delete(5));
        assert_eq!(out, Outcome::Deleted(ana()));
        assert_eq!(t.apply(Command::Find(5)), Outcome::NotFound(5));
    }

    #[test]
    fn failures_are_outcomes() {
        let mut t = DoubleHashTable::new();
        let fields = ContactFields::new("X", "x@x", "0").unwrap();
        let out = t.apply(Command::Update(42, fields));
        assert_eq!(out, Outcome::NotFound(42));
        assert!(!out.is_success());
        assert_eq!(out.to_string(), "contact 42 not found");
        assert_eq!(t.apply(Command::Delete(42)), Outcome::NotFound(42));

        t.apply(Command::Insert(ana()));
        let dup = t.apply(Command::Insert(ana()));
        assert_eq!(dup, Outcome::DuplicateKey(ana()));
        assert_eq!(dup.to_string(), "contact 5 already exists");
    }

    #[test]
    fn saturation_outcome() {
        let mut t = DoubleHashTable::with_capacity(1).unwrap();
        assert!(t.apply(Command::Insert(ana())).is_success());
        let late = Record::new(6, "Bo", "bo@x", "1").unwrap();
        let out = t.apply(Command::Insert(late.clone()));
        assert_eq!(out, Outcome::Saturated(late));
        assert_eq!(
            out.to_string(),
            "no free slot for contact 6: probe attempts exhausted"
        );
    }

    #[test]
    fn update_diagnose_and_list() {
        let mut t = DoubleHashTable::new();
        assert_eq!(t.apply(Command::Diagnose).to_string(), "no collisions");
        assert_eq!(t.apply(Command::List).to_string(), "no contacts");

        t.apply(Command::Insert(ana()));
        t.apply(Command::Insert(Record::new(80, "Bia", "bia@x", "2").unwrap()));
        let fields = ContactFields::new("Bia S.", "bia@x", "3").unwrap();
        assert_eq!(
            t.apply(Command::Update(80, fields)),
            Outcome::Updated { key: 80, index: 19 }
        );

        let diag = t.apply(Command::Diagnose);
        assert_eq!(
            diag.to_string(),
            "key 80 collided at slot 5, settled at slot 19; probed: 5 19"
        );

        let listing = t.apply(Command::List).to_string();
        assert_eq!(
            listing,
            "slot 5: key 5: Ana <ana@example.com> 555-0101\nslot 19: key 80: Bia S. <bia@x> 3"
        );
    }
}
