//! Relational store: schema introspection, duplicate lookup and single-row insert.
//!
//! The store never creates or alters tables. Destination schemas are discovered
//! at call time, so a column added to a table is picked up on the next run.

pub mod postgres;
pub mod sqlite;

pub use self::postgres::PostgresStore;
pub use sqlite::SqliteStore;

use crate::config::{DatabaseConfig, StoreBackend};
use crate::domain::{NaturalKey, NormalizedRow};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cannot connect to store: {0}")]
    Connection(String),

    #[error("query against '{table}' failed: {message}")]
    Query { table: String, message: String },

    #[error("insert into '{table}' failed: {message}")]
    Insert { table: String, message: String },
}

/// Operations the pipeline needs from a relational store.
///
/// Implementations acquire whatever connection they need per call and release
/// it before returning, on success and on error alike.
pub trait Store {
    /// Column names of `table`, ordered by position. Empty when the table does not exist.
    fn columns_of(&self, table: &str) -> Result<Vec<String>, StoreError>;

    /// Whether a row with this (ticker, report_date) already exists in `key.table`.
    fn exists(&self, key: &NaturalKey) -> Result<bool, StoreError>;

    /// Inserts one row into `table`, binding every cell of the row.
    fn insert(&self, table: &str, row: &NormalizedRow) -> Result<(), StoreError>;
}

/// Connects to the configured backend. Fails if the store cannot be reached.
pub fn open_store(config: &DatabaseConfig) -> Result<Box<dyn Store>, StoreError> {
    match config.backend {
        StoreBackend::Postgres => Ok(Box::new(PostgresStore::connect(config)?)),
        StoreBackend::Sqlite => Ok(Box::new(SqliteStore::connect(&config.path)?)),
    }
}

/// Quotes an SQL identifier, doubling embedded quotes.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
