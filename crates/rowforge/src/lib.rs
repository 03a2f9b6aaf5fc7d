//! Dependency-aware test fixtures for relational databases.
//!
//! ```no_run
//! # async fn run() -> rowforge::Result<()> {
//! let config = rowforge::RowforgeConfig::from_env()?;
//! let mut factory = rowforge::connect("local", &config).await?;
//! let order = factory.create_one("orders").await?;
//! println!("created order {:?}", order.get("id"));
//! factory.tear_down().await?;
//! factory.dispose().await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod registry;
pub mod telemetry;

pub use config::{CONFIG_ENV, RowforgeConfig};
pub use registry::{BackendConstructor, BackendRegistry, detect_engine};
pub use rowforge_core::{
    BoxFuture, ColumnDescriptor, Error, ForeignKeyRef, GeneratedRow, RecordIdentifier, Result,
    SemanticType, StorageBackend, TeardownLedger, Value,
};
pub use rowforge_generate::{AnyError, FixtureFactory, RecordGenerator, SchemaCache, any, synthesize};
pub use rowforge_postgres::{PostgresBackend, PostgresOptions};

/// Open a factory for a named connection or a raw connection string.
pub async fn connect(name_or_conn: &str, config: &RowforgeConfig) -> Result<FixtureFactory> {
    connect_with(&BackendRegistry::with_defaults(), name_or_conn, config).await
}

/// Like [`connect`], resolving the engine through `registry`.
pub async fn connect_with(
    registry: &BackendRegistry,
    name_or_conn: &str,
    config: &RowforgeConfig,
) -> Result<FixtureFactory> {
    let conn = config.resolve_connection(name_or_conn);
    let backend = registry.connect(conn, config).await?;
    let factory = FixtureFactory::new(backend);
    Ok(match config.seed {
        Some(seed) => factory.with_seed(seed),
        None => factory,
    })
}
