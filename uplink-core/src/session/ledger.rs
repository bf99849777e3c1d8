//! In-memory, process-lifetime log of completed dispatches.
//!
//! `append` is the only mutator. Aggregates are summed over the live
//! sequence on every read so they can never drift from it. Nothing here is
//! persisted; the ledger dies with the session.

use crate::models::record::UploadRecord;

/// Aggregate metrics derived from the current record sequence.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LedgerTotals {
    pub count: usize,

    /// Sum of record quantities: seconds for audio, rows for tables.
    pub total_quantity: f64,

    pub total_bytes: u64,
}

/// Append-only session ledger.
#[derive(Debug, Default)]
pub struct SessionLedger {
    records: Vec<UploadRecord>,
}

impl SessionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, record: UploadRecord) {
        self.records.push(record);
    }

    /// All records, in append order.
    pub fn all(&self) -> &[UploadRecord] {
        &self.records
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn totals(&self) -> LedgerTotals {
        LedgerTotals {
            count: self.records.len(),
            total_quantity: self.records.iter().map(|r| r.quantity).sum(),
            total_bytes: self.records.iter().map(|r| r.size_bytes).sum(),
        }
    }
}
