//! PostgreSQL storage backend for Rowforge.

pub mod options;
pub mod postgres;

pub use options::PostgresOptions;
pub use postgres::PostgresBackend;

/// Engine identifier used in connection-string detection and registries.
pub const ENGINE: &str = "postgres";
