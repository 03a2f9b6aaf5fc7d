//! Dependency-aware fixture generation for Rowforge.
//!
//! A [`FixtureFactory`] creates one row of a table together with the parent
//! rows its foreign keys require, records every insertion in a ledger and
//! deletes them again in reverse order on teardown.

pub mod any;
pub mod cache;
pub mod factory;
pub mod generator;
pub mod synthesizer;

pub use any::AnyError;
pub use cache::{SchemaCache, TableSchema};
pub use factory::FixtureFactory;
pub use generator::RecordGenerator;
pub use synthesizer::{synthesize, synthesize_at};
