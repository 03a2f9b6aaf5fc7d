use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use tracing::{debug, info, warn};

use rowforge_core::{
    ColumnDescriptor, Error, GeneratedRow, RecordIdentifier, Result, StorageBackend, Value,
    redact_connection_string,
};

use crate::options::PostgresOptions;

mod codec;
mod mapper;
mod queries;
mod sql;

pub use mapper::semantic_type;
pub use sql::TableRef;

use codec::{bind_all, decode_row, map_sqlx_error};

/// Storage backend for PostgreSQL databases.
#[derive(Debug, Clone)]
pub struct PostgresBackend {
    pool: PgPool,
    identity: String,
    options: PostgresOptions,
}

impl PostgresBackend {
    /// Create a backend over a pre-configured pool. `identity` keys the schema cache.
    pub fn new(pool: PgPool, identity: impl Into<String>, options: PostgresOptions) -> Self {
        Self {
            pool,
            identity: identity.into(),
            options,
        }
    }

    /// Open a pool for `conn`. The redacted connection string becomes the identity.
    pub async fn connect(conn: &str, options: PostgresOptions) -> Result<Self> {
        let redacted = redact_connection_string(conn);
        let pool = PgPoolOptions::new()
            .max_connections(options.max_connections)
            .acquire_timeout(options.acquire_timeout)
            .connect(conn)
            .await
            .map_err(|err| Error::BackendUnavailable(err.to_string()))?;

        info!(
            connection = %redacted.redacted,
            max_connections = options.max_connections,
            "connected to postgres"
        );
        Ok(Self::new(pool, redacted.redacted, options))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn options(&self) -> &PostgresOptions {
        &self.options
    }

    fn table_ref(&self, table: &str) -> TableRef {
        TableRef::parse(table, &self.options.default_schema)
    }
}

#[async_trait]
impl StorageBackend for PostgresBackend {
    fn identity(&self) -> &str {
        &self.identity
    }

    fn normalize_table(&self, table: &str) -> String {
        self.table_ref(table).canonical(&self.options.default_schema)
    }

    async fn get_schema(&self, table: &str) -> Result<Vec<ColumnDescriptor>> {
        let target = self.table_ref(table);
        let raw = queries::list_columns(&self.pool, &target.schema, &target.name).await?;
        if raw.is_empty() {
            return Err(Error::SchemaNotFound {
                table: table.to_string(),
            });
        }
        let columns = mapper::map_columns(raw, &self.options);
        debug!(table, columns = columns.len(), "described table");
        Ok(columns)
    }

    async fn record_exists(&self, table: &str, column: &str, value: &Value) -> Result<bool> {
        let statement = sql::exists(&self.table_ref(table), column, value);
        let row = bind_all(sqlx::query(&statement.sql), &statement.binds)
            .fetch_one(&self.pool)
            .await
            .map_err(|err| map_sqlx_error(table, err))?;
        row.try_get::<bool, _>(0)
            .map_err(|err| map_sqlx_error(table, err))
    }

    async fn insert(
        &self,
        table: &str,
        _schema: &[ColumnDescriptor],
        row: &GeneratedRow,
    ) -> Result<GeneratedRow> {
        let statement = sql::insert(&self.table_ref(table), row);
        let stored = bind_all(sqlx::query(&statement.sql), &statement.binds)
            .fetch_one(&self.pool)
            .await
            .map_err(|err| map_sqlx_error(table, err))?;
        decode_row(&stored)
    }

    async fn fetch_by_column(
        &self,
        table: &str,
        column: &str,
        value: &Value,
    ) -> Result<GeneratedRow> {
        let statement = sql::fetch(&self.table_ref(table), column, value);
        let row = bind_all(sqlx::query(&statement.sql), &statement.binds)
            .fetch_optional(&self.pool)
            .await
            .map_err(|err| map_sqlx_error(table, err))?;
        match row {
            Some(row) => decode_row(&row),
            None => Err(Error::RecordNotFound {
                table: table.to_string(),
                column: column.to_string(),
                value: value.to_string(),
            }),
        }
    }

    async fn delete_all(&self, records: &[RecordIdentifier]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|err| Error::BackendUnavailable(err.to_string()))?;
        for record in records {
            if record.value.is_null() {
                warn!(
                    table = %record.table,
                    column = %record.column,
                    "skipping teardown of row without identifying value"
                );
                continue;
            }
            let statement = sql::delete(&self.table_ref(&record.table), &record.column, &record.value);
            bind_all(sqlx::query(&statement.sql), &statement.binds)
                .execute(&mut *tx)
                .await
                .map_err(|err| map_sqlx_error(&record.table, err))?;
        }
        tx.commit()
            .await
            .map_err(|err| Error::Database(err.to_string()))?;

        debug!(records = records.len(), "deleted generated rows");
        Ok(())
    }

    async fn dispose(&self) -> Result<()> {
        self.pool.close().await;
        info!(connection = %self.identity, "closed postgres pool");
        Ok(())
    }
}
