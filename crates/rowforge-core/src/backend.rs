use std::future::Future;
use std::pin::Pin;

use async_trait::async_trait;

use crate::column::ColumnDescriptor;
use crate::error::Result;
use crate::ledger::RecordIdentifier;
use crate::value::{GeneratedRow, Value};

/// Boxed future used where recursion or type erasure needs a nameable future.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Capability set a database product must provide to host generated fixtures.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Stable identity of the underlying database, used to key schema caches.
    fn identity(&self) -> &str;

    /// Canonical spelling of a table name, so `public.users` and `users` compare equal.
    /// Table names are compared exactly after normalization.
    fn normalize_table(&self, table: &str) -> String {
        table.to_string()
    }

    /// Columns of `table` in schema order. Fails with `SchemaNotFound` for unknown tables.
    async fn get_schema(&self, table: &str) -> Result<Vec<ColumnDescriptor>>;

    async fn record_exists(&self, table: &str, column: &str, value: &Value) -> Result<bool>;

    /// Insert `row` and return it as stored, including backend-assigned identity values.
    async fn insert(
        &self,
        table: &str,
        schema: &[ColumnDescriptor],
        row: &GeneratedRow,
    ) -> Result<GeneratedRow>;

    /// Fetch the first row whose `column` equals `value`. Fails with `RecordNotFound`.
    async fn fetch_by_column(&self, table: &str, column: &str, value: &Value)
    -> Result<GeneratedRow>;

    /// Delete the given rows in the order provided, atomically when the store allows it.
    async fn delete_all(&self, records: &[RecordIdentifier]) -> Result<()>;

    /// Release connections held by the backend.
    async fn dispose(&self) -> Result<()>;
}
