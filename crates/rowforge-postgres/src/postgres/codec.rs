use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use sqlx::error::ErrorKind;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::Query;
use sqlx::{Column, Decode, Postgres, Row, Type, TypeInfo};
use uuid::Uuid;

use rowforge_core::{Error, GeneratedRow, Result, Value};

pub type PgQuery<'q> = Query<'q, Postgres, PgArguments>;

/// Attach `value` to the next placeholder of `query`.
pub fn bind_value<'q>(query: PgQuery<'q>, value: &Value) -> PgQuery<'q> {
    match value {
        Value::Null => query.bind(Option::<String>::None),
        Value::Bool(value) => query.bind(*value),
        Value::Int(value) => query.bind(*value),
        Value::Long(value) => query.bind(*value),
        Value::Decimal(value) => query.bind(*value),
        Value::Float(value) => query.bind(*value),
        Value::Text(value) => query.bind(value.clone()),
        Value::Uuid(value) => query.bind(*value),
        Value::Date(value) => query.bind(*value),
        Value::DateTime(value) => query.bind(*value),
    }
}

pub fn bind_all<'q>(mut query: PgQuery<'q>, values: &[&Value]) -> PgQuery<'q> {
    for value in values {
        query = bind_value(query, value);
    }
    query
}

/// Convert a result row into a generated row, column by column.
pub fn decode_row(row: &PgRow) -> Result<GeneratedRow> {
    let mut decoded = GeneratedRow::new();
    for column in row.columns() {
        let index = column.ordinal();
        let value = match column.type_info().name() {
            "BOOL" => decode(row, index, Value::Bool)?,
            "INT2" => decode(row, index, |value: i16| Value::Int(i32::from(value)))?,
            "INT4" => decode(row, index, Value::Int)?,
            "INT8" => decode(row, index, Value::Long)?,
            "NUMERIC" => decode(row, index, Value::Decimal)?,
            "FLOAT4" => decode(row, index, |value: f32| Value::Float(f64::from(value)))?,
            "FLOAT8" => decode(row, index, Value::Float)?,
            "UUID" => decode(row, index, Value::Uuid)?,
            "DATE" => decode(row, index, |value: NaiveDate| Value::Date(value))?,
            "TIMESTAMP" => decode(row, index, |value: NaiveDateTime| Value::DateTime(value))?,
            "TIMESTAMPTZ" => {
                decode(row, index, |value: DateTime<Utc>| Value::DateTime(value.naive_utc()))?
            }
            "TEXT" | "VARCHAR" | "CHAR" | "BPCHAR" | "NAME" => decode(row, index, Value::Text)?,
            _ => row
                .try_get::<Option<String>, _>(index)
                .ok()
                .flatten()
                .map_or(Value::Null, Value::Text),
        };
        decoded.set(column.name(), value);
    }
    Ok(decoded)
}

fn decode<'r, T>(row: &'r PgRow, index: usize, wrap: impl FnOnce(T) -> Value) -> Result<Value>
where
    T: Decode<'r, Postgres> + Type<Postgres>,
{
    let value: Option<T> = row
        .try_get(index)
        .map_err(|err| Error::Database(err.to_string()))?;
    Ok(value.map_or(Value::Null, wrap))
}

/// Map a driver error onto the shared error type.
pub fn map_sqlx_error(table: &str, err: sqlx::Error) -> Error {
    match err {
        sqlx::Error::Database(db) => match db.kind() {
            ErrorKind::UniqueViolation
            | ErrorKind::ForeignKeyViolation
            | ErrorKind::NotNullViolation
            | ErrorKind::CheckViolation => Error::ConstraintViolation {
                table: table.to_string(),
                message: db.message().to_string(),
            },
            _ => Error::Database(db.message().to_string()),
        },
        other @ (sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::Protocol(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed) => Error::BackendUnavailable(other.to_string()),
        other => Error::Database(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_failures_mean_the_backend_is_unavailable() {
        let err = map_sqlx_error("orders", sqlx::Error::PoolTimedOut);
        assert!(matches!(err, Error::BackendUnavailable(_)));
    }

    #[test]
    fn other_driver_errors_are_database_errors() {
        let err = map_sqlx_error("orders", sqlx::Error::RowNotFound);
        assert!(matches!(err, Error::Database(_)));
    }
}
