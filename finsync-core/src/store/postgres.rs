//! PostgreSQL-backed store.
//!
//! Like the SQLite store it holds only connection parameters: every operation
//! opens a client, runs its statement and drops the client on return.
//!
//! Values are sent in text format and parsed by the server against the
//! destination column's own type, so a row binds the same way whether a column
//! is `numeric`, `double precision`, `bigint` or `date`.

use super::{quote_ident, Store, StoreError};
use crate::config::DatabaseConfig;
use crate::domain::{NaturalKey, NormalizedRow, Scalar};
use bytes::BytesMut;
use postgres::types::{to_sql_checked, Format, IsNull, ToSql, Type};
use postgres::{Client, Config, NoTls};
use std::error::Error;
use std::time::Duration;
use tracing::debug;

const COLUMNS_SQL: &str = "SELECT column_name::text FROM information_schema.columns \
     WHERE table_schema::text = $1 AND table_name::text = $2 \
     ORDER BY ordinal_position";

#[derive(Clone)]
pub struct PostgresStore {
    config: Config,
    schema: String,
}

impl std::fmt::Debug for PostgresStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresStore")
            .field("hosts", &self.config.get_hosts())
            .field("dbname", &self.config.get_dbname())
            .field("schema", &self.schema)
            .finish()
    }
}

impl PostgresStore {
    /// Verifies a connection can be made, then returns a store for it.
    pub fn connect(db: &DatabaseConfig) -> Result<Self, StoreError> {
        let store = Self::from_config(db)?;
        store.open()?;
        Ok(store)
    }

    /// Builds the store without contacting the server.
    pub fn from_config(db: &DatabaseConfig) -> Result<Self, StoreError> {
        if db.host.trim().is_empty() {
            return Err(StoreError::Connection("no database host configured".into()));
        }
        if db.name.trim().is_empty() {
            return Err(StoreError::Connection("no database name configured".into()));
        }
        if db.user.trim().is_empty() {
            return Err(StoreError::Connection("no database user configured".into()));
        }

        let mut config = Config::new();
        config
            .host(&db.host)
            .port(db.port)
            .dbname(&db.name)
            .user(&db.user)
            .application_name("finsync")
            .connect_timeout(Duration::from_secs(db.connect_timeout_secs));
        if !db.password.is_empty() {
            config.password(&db.password);
        }

        Ok(Self {
            config,
            schema: db.schema.clone(),
        })
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    fn open(&self) -> Result<Client, StoreError> {
        self.config.connect(NoTls).map_err(|e| {
            let hosts = self.config.get_hosts();
            StoreError::Connection(format!("{hosts:?}:{:?}: {e}", self.config.get_ports()))
        })
    }

    /// Qualified, quoted name of `table` in the configured schema.
    fn qualified(&self, table: &str) -> String {
        format!("{}.{}", quote_ident(&self.schema), quote_ident(table))
    }
}

impl Store for PostgresStore {
    fn columns_of(&self, table: &str) -> Result<Vec<String>, StoreError> {
        let mut client = self.open()?;
        let rows = client
            .query(COLUMNS_SQL, &[&self.schema, &table])
            .map_err(|e| StoreError::Query {
                table: table.to_string(),
                message: e.to_string(),
            })?;
        let columns = rows
            .iter()
            .map(|row| row.try_get::<_, String>(0))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| StoreError::Query {
                table: table.to_string(),
                message: e.to_string(),
            })?;

        debug!(table, columns = columns.len(), "introspected schema");
        Ok(columns)
    }

    fn exists(&self, key: &NaturalKey) -> Result<bool, StoreError> {
        let mut client = self.open()?;
        let sql = exists_sql(&self.qualified(&key.table));
        let ticker = Scalar::from(key.ticker.as_str());
        let report_date = Scalar::Date(key.report_date);

        client
            .query_one(sql.as_str(), &[&ticker, &report_date])
            .and_then(|row| row.try_get::<_, bool>(0))
            .map_err(|e| StoreError::Query {
                table: key.table.clone(),
                message: e.to_string(),
            })
    }

    fn insert(&self, table: &str, row: &NormalizedRow) -> Result<(), StoreError> {
        let mut client = self.open()?;
        let columns: Vec<&str> = row.columns().collect();
        let sql = insert_sql(&self.qualified(table), &columns);
        let params: Vec<&(dyn ToSql + Sync)> =
            row.values().map(|v| v as &(dyn ToSql + Sync)).collect();

        client
            .execute(sql.as_str(), &params)
            .map(|_| ())
            .map_err(|e| StoreError::Insert {
                table: table.to_string(),
                message: e.to_string(),
            })
    }
}

fn exists_sql(qualified_table: &str) -> String {
    format!(
        "SELECT EXISTS (SELECT 1 FROM {qualified_table} WHERE ticker = $1 AND report_date = $2)"
    )
}

fn insert_sql(qualified_table: &str, columns: &[&str]) -> String {
    let names: Vec<String> = columns.iter().map(|c| quote_ident(c)).collect();
    let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("${i}")).collect();
    format!(
        "INSERT INTO {qualified_table} ({}) VALUES ({})",
        names.join(", "),
        placeholders.join(", ")
    )
}

/// Text a scalar is sent as; `None` binds SQL NULL.
fn wire_text(value: &Scalar) -> Option<String> {
    match value {
        Scalar::Null => None,
        Scalar::Float(x) if !x.is_finite() => None,
        Scalar::Bool(b) => Some(b.to_string()),
        Scalar::Int(i) => Some(i.to_string()),
        Scalar::Float(x) => Some(x.to_string()),
        Scalar::Text(s) => Some(s.clone()),
        Scalar::Date(d) => Some(d.format("%Y-%m-%d").to_string()),
    }
}

impl ToSql for Scalar {
    fn to_sql(&self, _ty: &Type, out: &mut BytesMut) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        match wire_text(self) {
            Some(text) => {
                out.extend_from_slice(text.as_bytes());
                Ok(IsNull::No)
            }
            None => Ok(IsNull::Yes),
        }
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    fn encode_format(&self, _ty: &Type) -> Format {
        Format::Text
    }

    to_sql_checked!();
}
