use std::sync::Arc;

use rand::RngCore;
use tracing::debug;

use rowforge_core::{
    BoxFuture, ColumnDescriptor, Error, ForeignKeyRef, GeneratedRow, RecordIdentifier, Result,
    StorageBackend, TeardownLedger, Treatment, Value,
};

use crate::cache::{SchemaCache, TableSchema};
use crate::synthesizer::synthesize;

/// Random source shared by every generator of one tree.
pub type TreeRng = dyn RngCore + Send;

/// Builds one row of a table, creating the parent rows its foreign keys need.
///
/// Every row inserted by the generator or its children is pushed onto the
/// shared ledger.
pub struct RecordGenerator<'a> {
    backend: &'a dyn StorageBackend,
    cache: &'a SchemaCache,
    ledger: &'a mut TeardownLedger,
    rng: &'a mut TreeRng,
    table: String,
    columns: TableSchema,
    depth: usize,
    /// Tables currently being generated, root first, ending with `table`.
    lineage: Vec<String>,
}

impl<'a> RecordGenerator<'a> {
    /// Generator for the root of a tree (depth 0).
    pub async fn new(
        backend: &'a dyn StorageBackend,
        cache: &'a SchemaCache,
        table: &str,
        ledger: &'a mut TeardownLedger,
        rng: &'a mut TreeRng,
    ) -> Result<Self> {
        let table = backend.normalize_table(table);
        let columns = load_columns(backend, cache, &table).await?;
        Ok(Self {
            backend,
            cache,
            ledger,
            rng,
            lineage: vec![table.clone()],
            table,
            columns,
            depth: 0,
        })
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    /// Generate, insert and record one row. Columns present in `overrides` are
    /// taken as given and never generated.
    pub fn generate(&mut self, overrides: GeneratedRow) -> BoxFuture<'_, Result<GeneratedRow>> {
        Box::pin(async move {
            let mut row = overrides;

            if !self.has_identity() {
                if let Some(existing) = self.find_existing(&mut row).await? {
                    return Ok(existing);
                }
            }

            self.populate(&mut row).await?;
            self.insert(row).await
        })
    }

    /// Probe the first non foreign key column with a fresh value and return the
    /// stored row when one already carries it.
    async fn find_existing(&mut self, row: &mut GeneratedRow) -> Result<Option<GeneratedRow>> {
        let columns = Arc::clone(&self.columns);
        let Some(probe) = columns.iter().find(|column| !column.is_foreign_key()) else {
            return Ok(None);
        };
        if row.contains(&probe.name) || probe.treatment() == Treatment::Skipped {
            return Ok(None);
        }

        let value = synthesize(probe, &mut *self.rng)?;
        row.insert_if_absent(probe.name.clone(), value.clone());

        if !self
            .backend
            .record_exists(&self.table, &probe.name, &value)
            .await?
        {
            return Ok(None);
        }

        debug!(
            table = %self.table,
            column = %probe.name,
            value = %value,
            "reusing existing row"
        );
        let existing = self
            .backend
            .fetch_by_column(&self.table, &probe.name, &value)
            .await?;
        Ok(Some(existing))
    }

    async fn populate(&mut self, row: &mut GeneratedRow) -> Result<()> {
        let columns = Arc::clone(&self.columns);
        for column in columns.iter() {
            if row.contains(&column.name) {
                continue;
            }

            match column.treatment() {
                Treatment::Skipped | Treatment::Identity => {}
                Treatment::ForeignKey(fk) => {
                    if let Some(value) = self.resolve_foreign_key(column, fk).await? {
                        row.insert_if_absent(column.name.clone(), value);
                    }
                }
                Treatment::Plain => {
                    let value = self.synthesize_plain(column).await?;
                    row.insert_if_absent(column.name.clone(), value);
                }
            }
        }
        Ok(())
    }

    async fn resolve_foreign_key(
        &mut self,
        column: &ColumnDescriptor,
        fk: &ForeignKeyRef,
    ) -> Result<Option<Value>> {
        let target = self.backend.normalize_table(&fk.table);

        if target == self.table {
            if self.depth > 0 {
                debug!(
                    table = %self.table,
                    column = %column.name,
                    depth = self.depth,
                    "leaving nested self reference unset"
                );
                return Ok(None);
            }
        } else {
            if let Some(record) = self.ledger.find(&target, &fk.column) {
                debug!(
                    table = %self.table,
                    column = %column.name,
                    parent = %target,
                    "reusing parent row from ledger"
                );
                return Ok(Some(record.value.clone()));
            }
            if self.lineage.contains(&target) {
                let mut path = self.lineage.clone();
                path.push(target);
                return Err(Error::CycleDetected {
                    path: path.join(" -> "),
                });
            }
        }

        let parent = self.child(&target).await?.generate(GeneratedRow::new()).await?;
        parent
            .get(&fk.column)
            .cloned()
            .map(Some)
            .ok_or_else(|| Error::MissingReferencedValue {
                table: target,
                column: fk.column.clone(),
            })
    }

    /// Synthesize a value, redrawing unique columns until the backend reports no clash.
    async fn synthesize_plain(&mut self, column: &ColumnDescriptor) -> Result<Value> {
        let mut value = synthesize(column, &mut *self.rng)?;
        if !column.is_unique {
            return Ok(value);
        }

        let mut attempts = 1_u32;
        while self
            .backend
            .record_exists(&self.table, &column.name, &value)
            .await?
        {
            attempts += 1;
            debug!(
                table = %self.table,
                column = %column.name,
                attempts,
                "unique value taken, drawing again"
            );
            value = synthesize(column, &mut *self.rng)?;
        }
        Ok(value)
    }

    async fn insert(&mut self, row: GeneratedRow) -> Result<GeneratedRow> {
        let stored = self.backend.insert(&self.table, &self.columns, &row).await?;

        let identifying = self.identifying_column()?.name.clone();
        let value = stored
            .get(&identifying)
            .cloned()
            .ok_or_else(|| Error::MissingReferencedValue {
                table: self.table.clone(),
                column: identifying.clone(),
            })?;

        debug!(
            table = %self.table,
            depth = self.depth,
            column = %identifying,
            value = %value,
            "row inserted"
        );
        self.ledger
            .push(RecordIdentifier::new(self.table.clone(), identifying, value));
        Ok(stored)
    }

    async fn child(&mut self, table: &str) -> Result<RecordGenerator<'_>> {
        let columns = load_columns(self.backend, self.cache, table).await?;
        let mut lineage = self.lineage.clone();
        lineage.push(table.to_string());
        Ok(RecordGenerator {
            backend: self.backend,
            cache: self.cache,
            ledger: &mut *self.ledger,
            rng: &mut *self.rng,
            table: table.to_string(),
            columns,
            depth: self.depth + 1,
            lineage,
        })
    }

    fn has_identity(&self) -> bool {
        self.columns.iter().any(|column| column.is_identity)
    }

    /// Identity column if present, else the first column.
    fn identifying_column(&self) -> Result<&ColumnDescriptor> {
        self.columns
            .iter()
            .find(|column| column.is_identity)
            .or_else(|| self.columns.first())
            .ok_or_else(|| Error::SchemaNotFound {
                table: self.table.clone(),
            })
    }
}

async fn load_columns(
    backend: &dyn StorageBackend,
    cache: &SchemaCache,
    table: &str,
) -> Result<TableSchema> {
    let columns = cache.get(backend, table).await?;
    if columns.is_empty() {
        return Err(Error::SchemaNotFound {
            table: table.to_string(),
        });
    }
    Ok(columns)
}
