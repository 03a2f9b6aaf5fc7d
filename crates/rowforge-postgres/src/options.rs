use std::time::Duration;

/// Options that control how the Postgres backend connects and describes tables.
#[derive(Debug, Clone)]
pub struct PostgresOptions {
    /// Schema assumed for unqualified table names.
    pub default_schema: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
    /// Length used for text columns without a declared maximum.
    pub text_length_cap: u32,
}

impl Default for PostgresOptions {
    fn default() -> Self {
        Self {
            default_schema: "public".to_string(),
            max_connections: 5,
            acquire_timeout: Duration::from_secs(10),
            text_length_cap: 256,
        }
    }
}
