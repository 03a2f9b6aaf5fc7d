use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use rowforge_core::{Error, Result};
use rowforge_postgres::PostgresOptions;

/// Environment variable naming the configuration file read by [`RowforgeConfig::from_env`].
pub const CONFIG_ENV: &str = "ROWFORGE_CONFIG";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RowforgeConfig {
    /// Named connection strings.
    pub connections: BTreeMap<String, String>,
    pub default_schema: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    /// Fixed seed for reproducible runs.
    pub seed: Option<u64>,
    pub text_length_cap: u32,
}

impl Default for RowforgeConfig {
    fn default() -> Self {
        Self {
            connections: BTreeMap::new(),
            default_schema: "public".to_string(),
            max_connections: 5,
            acquire_timeout_secs: 10,
            seed: None,
            text_length_cap: 256,
        }
    }
}

impl RowforgeConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|err| {
            Error::InvalidConfig(format!("reading {}: {err}", path.display()))
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: RowforgeConfig =
            toml::from_str(content).map_err(|err| Error::InvalidConfig(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load the file named by `ROWFORGE_CONFIG`, or defaults when it is unset.
    pub fn from_env() -> Result<Self> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// The named connection if `name_or_conn` is a key of `connections`, else the argument.
    pub fn resolve_connection<'a>(&'a self, name_or_conn: &'a str) -> &'a str {
        self.connections
            .get(name_or_conn)
            .map_or(name_or_conn, String::as_str)
    }

    pub fn postgres_options(&self) -> PostgresOptions {
        PostgresOptions {
            default_schema: self.default_schema.clone(),
            max_connections: self.max_connections,
            acquire_timeout: Duration::from_secs(self.acquire_timeout_secs),
            text_length_cap: self.text_length_cap,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.default_schema.trim().is_empty() {
            return Err(Error::InvalidConfig("default_schema must not be empty".to_string()));
        }
        if self.max_connections == 0 {
            return Err(Error::InvalidConfig("max_connections must be at least 1".to_string()));
        }
        if self.text_length_cap == 0 {
            return Err(Error::InvalidConfig("text_length_cap must be at least 1".to_string()));
        }
        Ok(())
    }
}
