//! Core contracts for Rowforge.
//!
//! This crate defines the column descriptors, row values, teardown ledger and
//! the storage backend capability shared by the generator and the adapters.

pub mod backend;
pub mod column;
pub mod error;
pub mod ledger;
pub mod redaction;
pub mod value;

pub use backend::{BoxFuture, StorageBackend};
pub use column::{ColumnDescriptor, ForeignKeyRef, SemanticType, Treatment};
pub use error::{Error, Result};
pub use ledger::{RecordIdentifier, TeardownLedger};
pub use redaction::{redact_connection_string, RedactedConnection};
pub use value::{GeneratedRow, Value};
