use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::info;

use rowforge_core::{BoxFuture, Error, Result, StorageBackend, redact_connection_string};
use rowforge_postgres::PostgresBackend;

use crate::config::RowforgeConfig;

/// Builds a backend for one engine from a connection string.
pub type BackendConstructor =
    for<'a> fn(&'a str, &'a RowforgeConfig) -> BoxFuture<'a, Result<Arc<dyn StorageBackend>>>;

/// Engine ids mapped to backend constructors.
#[derive(Clone, Default)]
pub struct BackendRegistry {
    constructors: BTreeMap<String, BackendConstructor>,
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every backend shipped in this workspace.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(rowforge_postgres::ENGINE, connect_postgres);
        registry
    }

    /// Register `constructor` for `engine`, returning the one it replaces.
    pub fn register(
        &mut self,
        engine: impl Into<String>,
        constructor: BackendConstructor,
    ) -> Option<BackendConstructor> {
        self.constructors.insert(engine.into(), constructor)
    }

    pub fn engines(&self) -> impl Iterator<Item = &str> {
        self.constructors.keys().map(String::as_str)
    }

    pub async fn connect(
        &self,
        conn: &str,
        config: &RowforgeConfig,
    ) -> Result<Arc<dyn StorageBackend>> {
        let redacted = redact_connection_string(conn).redacted;
        let engine = detect_engine(conn).ok_or_else(|| Error::UnsupportedEngine(redacted.clone()))?;
        let constructor = self
            .constructors
            .get(&engine)
            .ok_or_else(|| Error::UnsupportedEngine(engine.clone()))?;

        info!(engine = %engine, connection = %redacted, "opening backend");
        constructor(conn, config).await
    }
}

/// Engine id from the connection string scheme. `postgresql` is folded into `postgres`.
pub fn detect_engine(conn: &str) -> Option<String> {
    let (scheme, _) = conn.trim().split_once("://")?;
    if scheme.is_empty() {
        return None;
    }
    let scheme = scheme.to_ascii_lowercase();
    match scheme.as_str() {
        "postgres" | "postgresql" => Some(rowforge_postgres::ENGINE.to_string()),
        _ => Some(scheme),
    }
}

fn connect_postgres<'a>(
    conn: &'a str,
    config: &'a RowforgeConfig,
) -> BoxFuture<'a, Result<Arc<dyn StorageBackend>>> {
    Box::pin(async move {
        let backend = PostgresBackend::connect(conn, config.postgres_options()).await?;
        Ok(Arc::new(backend) as Arc<dyn StorageBackend>)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn postgres_schemes_are_recognised() {
        assert_eq!(detect_engine("postgres://localhost/app").as_deref(), Some("postgres"));
        assert_eq!(detect_engine("PostgreSQL://localhost/app").as_deref(), Some("postgres"));
        assert_eq!(detect_engine("mysql://localhost/app").as_deref(), Some("mysql"));
        assert_eq!(detect_engine("Server=.;Database=app"), None);
    }

    #[test]
    fn defaults_register_postgres() {
        let registry = BackendRegistry::with_defaults();
        assert_eq!(registry.engines().collect::<Vec<_>>(), vec!["postgres"]);
    }
}
