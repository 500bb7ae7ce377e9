//! Bulk load and export boundary.
//!
//! The table neither parses nor formats any external representation. A
//! `RecordSource` hands it ready-made records; a `RecordSink` receives the
//! occupied slots in index order.

use crate::double_hash_table::{DoubleHashTable, InsertError};
use crate::record::Record;
use serde::Serialize;
use tracing::{debug, warn};

pub trait RecordSource {
    fn records(&mut self) -> Box<dyn Iterator<Item = Record> + '_>;
}

impl RecordSource for Vec<Record> {
    fn records(&mut self) -> Box<dyn Iterator<Item = Record> + '_> {
        Box::new(self.drain(..))
    }
}

/// Adapts any iterator of records into a `RecordSource`. Once drained it
/// yields nothing.
pub struct IterSource<I>(I);

impl<I> IterSource<I>
where
    I: Iterator<Item = Record>,
{
    pub fn new(it: impl IntoIterator<IntoIter = I>) -> Self {
        IterSource(it.into_iter())
    }
}

impl<I> RecordSource for IterSource<I>
where
    I: Iterator<Item = Record>,
{
    fn records(&mut self) -> Box<dyn Iterator<Item = Record> + '_> {
        Box::new(&mut self.0)
    }
}

pub trait RecordSink {
    type Error;

    fn accept(&mut self, index: usize, record: &Record) -> Result<(), Self::Error>;
}

impl RecordSink for Vec<(usize, Record)> {
    type Error = core::convert::Infallible;

    fn accept(&mut self, index: usize, record: &Record) -> Result<(), Self::Error> {
        self.push((index, record.clone()));
        Ok(())
    }
}

/// Outcome of a bulk load. Records that could not be stored are kept so
/// the caller can report or retry them.
#[derive(Debug, Default, Serialize)]
pub struct LoadReport {
    pub inserted: usize,
    pub saturated: Vec<Record>,
    pub duplicates: Vec<Record>,
}

impl LoadReport {
    pub fn rejected(&self) -> usize {
        self.saturated.len() + self.duplicates.len()
    }

    pub fn is_complete(&self) -> bool {
        self.rejected() == 0
    }
}

impl DoubleHashTable {
    /// Inserts every record the source yields, in order. Individual
    /// failures are collected, never fatal.
    pub fn load_from<S>(&mut self, source: &mut S) -> LoadReport
    where
        S: RecordSource + ?Sized,
    {
        let mut report = LoadReport::default();
        for record in source.records() {
            match self.insert(record) {
                Ok(_) => report.inserted += 1,
                Err(InsertError::Saturated(r)) => report.saturated.push(r),
                Err(InsertError::DuplicateKey(r)) => report.duplicates.push(r),
            }
        }
        if report.is_complete() {
            debug!(inserted = report.inserted, "bulk load finished");
        } else {
            warn!(
                inserted = report.inserted,
                saturated = report.saturated.len(),
                duplicates = report.duplicates.len(),
                "bulk load left records out"
            );
        }
        report
    }

    /// Feeds every occupied `(slot index, record)` pair to `sink` in index
    /// order and returns how many were written.
    pub fn export_to<K>(&self, sink: &mut K) -> Result<usize, K::Error>
    where
        K: RecordSink + ?Sized,
    {
        let mut written = 0;
        for (idx, record) in self.iter() {
            sink.accept(idx, record)?;
            written += 1;
        }
        debug!(written, "exported records");
        Ok(written)
    }
}
