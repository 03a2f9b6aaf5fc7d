#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;

use rowforge_core::{
    ColumnDescriptor, Error, GeneratedRow, RecordIdentifier, Result, StorageBackend, Value,
};

/// Backend call as observed by the fake.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    GetSchema(String),
    Exists(String, String, Value),
    Insert(String, GeneratedRow),
    Fetch(String, String, Value),
    DeleteAll(Vec<RecordIdentifier>),
    Dispose,
}

#[derive(Default)]
struct State {
    calls: Vec<Call>,
    rows: HashMap<String, Vec<GeneratedRow>>,
    next_identity: i32,
    scripted_exists: HashMap<(String, String), VecDeque<bool>>,
    failing_inserts: Vec<String>,
}

/// In-memory backend that records every call.
pub struct FakeBackend {
    identity: String,
    schemas: HashMap<String, Vec<ColumnDescriptor>>,
    fold_names: bool,
    state: Mutex<State>,
}

impl FakeBackend {
    pub fn new(identity: &str) -> Self {
        Self {
            identity: identity.to_string(),
            schemas: HashMap::new(),
            fold_names: false,
            state: Mutex::new(State {
                next_identity: 100,
                ..State::default()
            }),
        }
    }

    pub fn with_table(mut self, table: &str, columns: Vec<ColumnDescriptor>) -> Self {
        self.schemas.insert(table.to_string(), columns);
        self
    }

    /// Normalize table names to lower case, like a server that folds
    /// unquoted identifiers.
    pub fn folding_table_names(mut self) -> Self {
        self.fold_names = true;
        self
    }

    pub fn with_row(self, table: &str, row: GeneratedRow) -> Self {
        self.lock().rows.entry(table.to_string()).or_default().push(row);
        self
    }

    /// Answers for `record_exists` on one column, consumed in order before
    /// falling back to the stored rows.
    pub fn script_exists(&self, table: &str, column: &str, answers: &[bool]) {
        self.lock()
            .scripted_exists
            .insert((table.to_string(), column.to_string()), answers.iter().copied().collect());
    }

    pub fn fail_inserts_into(&self, table: &str) {
        self.lock().failing_inserts.push(table.to_string());
    }

    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    pub fn inserts(&self) -> Vec<(String, GeneratedRow)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Insert(table, row) => Some((table, row)),
                _ => None,
            })
            .collect()
    }

    pub fn inserted_tables(&self) -> Vec<String> {
        self.inserts().into_iter().map(|(table, _)| table).collect()
    }

    pub fn schema_requests(&self, table: &str) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, Call::GetSchema(name) if name == table))
            .count()
    }

    pub fn deletions(&self) -> Vec<Vec<RecordIdentifier>> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::DeleteAll(records) => Some(records),
                _ => None,
            })
            .collect()
    }

    pub fn stored_rows(&self, table: &str) -> usize {
        self.lock().rows.get(table).map_or(0, Vec::len)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl StorageBackend for FakeBackend {
    fn identity(&self) -> &str {
        &self.identity
    }

    fn normalize_table(&self, table: &str) -> String {
        if self.fold_names {
            table.to_ascii_lowercase()
        } else {
            table.to_string()
        }
    }

    async fn get_schema(&self, table: &str) -> Result<Vec<ColumnDescriptor>> {
        self.lock().calls.push(Call::GetSchema(table.to_string()));
        self.schemas
            .get(table)
            .cloned()
            .ok_or_else(|| Error::SchemaNotFound {
                table: table.to_string(),
            })
    }

    async fn record_exists(&self, table: &str, column: &str, value: &Value) -> Result<bool> {
        let mut state = self.lock();
        state.calls.push(Call::Exists(
            table.to_string(),
            column.to_string(),
            value.clone(),
        ));
        let key = (table.to_string(), column.to_string());
        if let Some(answer) = state
            .scripted_exists
            .get_mut(&key)
            .and_then(VecDeque::pop_front)
        {
            return Ok(answer);
        }
        Ok(state
            .rows
            .get(table)
            .is_some_and(|rows| rows.iter().any(|row| row.get(column) == Some(value))))
    }

    async fn insert(
        &self,
        table: &str,
        schema: &[ColumnDescriptor],
        row: &GeneratedRow,
    ) -> Result<GeneratedRow> {
        let mut state = self.lock();
        state.calls.push(Call::Insert(table.to_string(), row.clone()));
        if state.failing_inserts.iter().any(|name| name == table) {
            return Err(Error::ConstraintViolation {
                table: table.to_string(),
                message: "rejected by fake".to_string(),
            });
        }

        let mut stored = row.clone();
        for column in schema.iter().filter(|column| column.is_identity) {
            state.next_identity += 1;
            stored.set(column.name.clone(), Value::Int(state.next_identity));
        }
        state
            .rows
            .entry(table.to_string())
            .or_default()
            .push(stored.clone());
        Ok(stored)
    }

    async fn fetch_by_column(
        &self,
        table: &str,
        column: &str,
        value: &Value,
    ) -> Result<GeneratedRow> {
        let mut state = self.lock();
        state.calls.push(Call::Fetch(
            table.to_string(),
            column.to_string(),
            value.clone(),
        ));
        state
            .rows
            .get(table)
            .and_then(|rows| rows.iter().find(|row| row.get(column) == Some(value)))
            .cloned()
            .ok_or_else(|| Error::RecordNotFound {
                table: table.to_string(),
                column: column.to_string(),
                value: value.to_string(),
            })
    }

    async fn delete_all(&self, records: &[RecordIdentifier]) -> Result<()> {
        let mut state = self.lock();
        state.calls.push(Call::DeleteAll(records.to_vec()));
        for record in records {
            if let Some(rows) = state.rows.get_mut(&record.table) {
                rows.retain(|row| row.get(&record.column) != Some(&record.value));
            }
        }
        Ok(())
    }

    async fn dispose(&self) -> Result<()> {
        self.lock().calls.push(Call::Dispose);
        Ok(())
    }
}
