use thiserror::Error;

/// Core error type shared across Rowforge crates.
#[derive(Debug, Error)]
pub enum Error {
    /// The backend has no table with this name.
    #[error("table not found: {table}")]
    SchemaNotFound { table: String },
    /// The synthesizer could not produce a value for a column.
    #[error("could not generate value for column name=[{column}] type=[{column_type}]: {reason}")]
    ValueSynthesisFailed {
        column: String,
        column_type: String,
        reason: String,
    },
    /// The backend rejected a row (unique, foreign key, not null or check violation).
    #[error("constraint violation on {table}: {message}")]
    ConstraintViolation { table: String, message: String },
    /// A fetch found nothing after an existence check reported a match.
    #[error("record not found: {table}.{column} = {value}")]
    RecordNotFound {
        table: String,
        column: String,
        value: String,
    },
    /// A stored row did not carry a column the generator needed from it.
    #[error("row of {table} has no value for column {column}")]
    MissingReferencedValue { table: String, column: String },
    /// Foreign keys form a cycle through more than one table.
    #[error("foreign key cycle detected: {path}")]
    CycleDetected { path: String },
    /// Connection, pool or transport failure.
    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),
    /// Server-side failure that is not a constraint violation.
    #[error("database error: {0}")]
    Database(String),
    /// Configuration could not be read or is inconsistent.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// No backend is registered for the connection's engine.
    #[error("unsupported engine: {0}")]
    UnsupportedEngine(String),
}

/// Convenience alias for results returned by Rowforge crates.
pub type Result<T> = std::result::Result<T, Error>;
