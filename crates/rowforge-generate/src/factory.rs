use std::sync::Arc;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{info, warn};

use rowforge_core::{GeneratedRow, Result, StorageBackend, TeardownLedger};

use crate::cache::SchemaCache;
use crate::generator::RecordGenerator;

/// Entry point for tests: creates rows with their dependencies and removes
/// them again on teardown.
///
/// Each `create_one` call builds an independent generation tree with its own
/// ledger. Teardown processes the most recent tree first.
pub struct FixtureFactory {
    backend: Arc<dyn StorageBackend>,
    cache: Arc<SchemaCache>,
    rng: ChaCha8Rng,
    teardowns: Vec<TeardownLedger>,
}

impl FixtureFactory {
    /// Factory using the process-wide schema cache.
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self::with_cache(backend, SchemaCache::shared())
    }

    pub fn with_cache(backend: Arc<dyn StorageBackend>, cache: Arc<SchemaCache>) -> Self {
        Self {
            backend,
            cache,
            rng: ChaCha8Rng::from_os_rng(),
            teardowns: Vec::new(),
        }
    }

    /// Drive all synthesis from `seed` so runs are reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
        self
    }

    pub fn backend(&self) -> &Arc<dyn StorageBackend> {
        &self.backend
    }

    pub fn cache(&self) -> &Arc<SchemaCache> {
        &self.cache
    }

    /// Number of generation trees waiting for teardown.
    pub fn pending_teardowns(&self) -> usize {
        self.teardowns.len()
    }

    /// Create one row of `table`, generating every value.
    pub async fn create_one(&mut self, table: &str) -> Result<GeneratedRow> {
        self.create(table, GeneratedRow::new()).await
    }

    /// Create one row of `table` after `define` has pre-assigned column values.
    /// Assigned columns are used as given; foreign keys among them spawn no parent row.
    pub async fn create_one_with<F>(&mut self, table: &str, define: F) -> Result<GeneratedRow>
    where
        F: FnOnce(&mut GeneratedRow),
    {
        let mut overrides = GeneratedRow::new();
        define(&mut overrides);
        self.create(table, overrides).await
    }

    async fn create(&mut self, table: &str, overrides: GeneratedRow) -> Result<GeneratedRow> {
        let mut ledger = TeardownLedger::new();
        let result = generate_tree(
            self.backend.as_ref(),
            &self.cache,
            table,
            &mut ledger,
            &mut self.rng,
            overrides,
        )
        .await;

        // Rows inserted before a failure stay eligible for teardown.
        if !ledger.is_empty() {
            self.teardowns.push(ledger);
        }

        match &result {
            Ok(_) => info!(table, "fixture created"),
            Err(err) => warn!(table, error = %err, "fixture creation failed"),
        }
        result
    }

    /// Delete every row created so far, newest tree first and newest row first
    /// within a tree.
    ///
    /// Every pending tree is attempted; the first failure is returned.
    pub async fn tear_down(&mut self) -> Result<()> {
        let mut first_error = None;

        while let Some(mut ledger) = self.teardowns.pop() {
            let records = ledger.drain_for_teardown();
            let rows = records.len();
            match self.backend.delete_all(&records).await {
                Ok(()) => info!(rows, "fixture tree torn down"),
                Err(err) => {
                    warn!(rows, error = %err, "fixture teardown failed");
                    first_error.get_or_insert(err);
                }
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Release the backend. Pending trees are not torn down.
    pub async fn dispose(self) -> Result<()> {
        if !self.teardowns.is_empty() {
            warn!(
                pending = self.teardowns.len(),
                "disposing factory with rows still in place"
            );
        }
        self.backend.dispose().await
    }
}

async fn generate_tree(
    backend: &dyn StorageBackend,
    cache: &SchemaCache,
    table: &str,
    ledger: &mut TeardownLedger,
    rng: &mut ChaCha8Rng,
    overrides: GeneratedRow,
) -> Result<GeneratedRow> {
    let mut generator = RecordGenerator::new(backend, cache, table, ledger, rng).await?;
    generator.generate(overrides).await
}
