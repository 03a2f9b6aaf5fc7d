use serde::Serialize;

use crate::value::Value;

/// One row inserted during a generation tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordIdentifier {
    pub table: String,
    /// Identity column if the table has one, else its first column.
    pub column: String,
    pub value: Value,
}

impl RecordIdentifier {
    pub fn new(table: impl Into<String>, column: impl Into<String>, value: Value) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
            value,
        }
    }
}

/// Push-only record of inserted rows, in insertion order.
///
/// Rows are removed last-in-first-out so children go before the parents they
/// reference.
#[derive(Debug, Clone, Default)]
pub struct TeardownLedger {
    records: Vec<RecordIdentifier>,
}

impl TeardownLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: RecordIdentifier) {
        self.records.push(record);
    }

    /// Most recent record for `(table, column)`.
    pub fn find(&self, table: &str, column: &str) -> Option<&RecordIdentifier> {
        self.records
            .iter()
            .rev()
            .find(|record| record.table == table && record.column == column)
    }

    /// Records in insertion order.
    pub fn records(&self) -> &[RecordIdentifier] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Empty the ledger, returning its records in deletion order (newest first).
    pub fn drain_for_teardown(&mut self) -> Vec<RecordIdentifier> {
        let mut records = std::mem::take(&mut self.records);
        records.reverse();
        records
    }
}
