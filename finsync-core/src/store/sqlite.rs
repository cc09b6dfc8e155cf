//! SQLite-backed store.
//!
//! Holds only the database path. Each operation opens its own connection and
//! drops it when the operation's scope ends.

use super::{quote_ident, Store, StoreError};
use crate::domain::{NaturalKey, NormalizedRow, Scalar};
use rusqlite::{params, params_from_iter, Connection, OpenFlags};
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct SqliteStore {
    path: PathBuf,
}

impl SqliteStore {
    /// Verifies the database can be opened, then returns a store for it.
    ///
    /// The database must already exist: the schema is owned elsewhere, so an
    /// absent file is a connection failure rather than an empty database.
    pub fn connect(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let store = Self { path: path.into() };
        store.open()?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> Result<Connection, StoreError> {
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        Connection::open_with_flags(&self.path, flags).map_err(|e| {
            StoreError::Connection(format!("{}: {e}", self.path.display()))
        })
    }
}

impl Store for SqliteStore {
    fn columns_of(&self, table: &str) -> Result<Vec<String>, StoreError> {
        let conn = self.open()?;
        let query_err = |e: rusqlite::Error| StoreError::Query {
            table: table.to_string(),
            message: e.to_string(),
        };

        let mut stmt = conn
            .prepare("SELECT name FROM pragma_table_info(?1) ORDER BY cid")
            .map_err(query_err)?;
        let columns = stmt
            .query_map(params![table], |row| row.get::<_, String>(0))
            .map_err(query_err)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(query_err)?;

        debug!(table, columns = columns.len(), "introspected schema");
        Ok(columns)
    }

    fn exists(&self, key: &NaturalKey) -> Result<bool, StoreError> {
        let conn = self.open()?;
        let sql = format!(
            "SELECT EXISTS (SELECT 1 FROM {} WHERE ticker = ?1 AND report_date = ?2)",
            quote_ident(&key.table)
        );
        conn.query_row(
            &sql,
            params![key.ticker, Scalar::Date(key.report_date)],
            |row| row.get::<_, bool>(0),
        )
        .map_err(|e| StoreError::Query {
            table: key.table.clone(),
            message: e.to_string(),
        })
    }

    fn insert(&self, table: &str, row: &NormalizedRow) -> Result<(), StoreError> {
        let conn = self.open()?;
        let columns: Vec<String> = row.columns().map(quote_ident).collect();
        let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{i}")).collect();
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote_ident(table),
            columns.join(", "),
            placeholders.join(", ")
        );

        conn.execute(&sql, params_from_iter(row.values()))
            .map(|_| ())
            .map_err(|e| StoreError::Insert {
                table: table.to_string(),
                message: e.to_string(),
            })
    }
}
