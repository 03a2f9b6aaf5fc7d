use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};

use tracing::debug;

use rowforge_core::{ColumnDescriptor, Result, StorageBackend};

/// Cached column list for one table.
pub type TableSchema = Arc<[ColumnDescriptor]>;

type CacheKey = (String, String);

/// Memoized schema lookups keyed by backend identity and table name.
///
/// Misses are resolved outside the lock, so concurrent misses on the same key
/// may both introspect; the first complete result stored is kept.
#[derive(Debug, Default)]
pub struct SchemaCache {
    entries: RwLock<HashMap<CacheKey, TableSchema>>,
}

static SHARED: OnceLock<Arc<SchemaCache>> = OnceLock::new();

impl SchemaCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide cache used by factories that are not given one explicitly.
    pub fn shared() -> Arc<SchemaCache> {
        Arc::clone(SHARED.get_or_init(|| Arc::new(SchemaCache::new())))
    }

    /// Return the columns of `table`, introspecting through `backend` on first use.
    pub async fn get(&self, backend: &dyn StorageBackend, table: &str) -> Result<TableSchema> {
        if let Some(columns) = self.cached(backend.identity(), table) {
            return Ok(columns);
        }

        debug!(table, "schema cache miss");
        let columns: TableSchema = backend.get_schema(table).await?.into();

        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let stored = entries
            .entry(key(backend.identity(), table))
            .or_insert(columns);
        Ok(Arc::clone(stored))
    }

    pub fn cached(&self, identity: &str, table: &str) -> Option<TableSchema> {
        let entries = self
            .entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        entries.get(&key(identity, table)).cloned()
    }

    /// Drop one entry. Returns whether it was present.
    pub fn invalidate(&self, identity: &str, table: &str) -> bool {
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        entries.remove(&key(identity, table)).is_some()
    }

    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn key(identity: &str, table: &str) -> CacheKey {
    (identity.to_string(), table.to_string())
}
