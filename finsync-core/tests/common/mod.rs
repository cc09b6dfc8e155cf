//! Shared fixtures: scripted provider, recording progress, temp databases.

#![allow(dead_code)]

use chrono::NaiveDate;
use finsync_core::domain::{DataType, NaturalKey, NormalizedRow, RawPayload, Scalar, WideTable};
use finsync_core::error::IngestError;
use finsync_core::normalize::NormalizeReport;
use finsync_core::pipeline::{RunSummary, UnitOutcome};
use finsync_core::progress::IngestProgress;
use finsync_core::provider::{InfoBundle, MarketDataProvider, ProviderError};
use finsync_core::store::{SqliteStore, Store, StoreError};
use rusqlite::Connection;
use std::cell::Cell;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Mutex;
use tempfile::TempDir;

/// Provider answering from canned payloads. Tickers in `unreachable` fail
/// every call.
#[derive(Default)]
pub struct ScriptedProvider {
    pub tables: HashMap<(String, DataType), RawPayload>,
    pub info: HashMap<String, InfoBundle>,
    pub unreachable: HashSet<String>,
}

impl ScriptedProvider {
    pub fn with_table(mut self, ticker: &str, kind: DataType, payload: RawPayload) -> Self {
        self.tables.insert((ticker.to_string(), kind), payload);
        self
    }

    pub fn with_info(mut self, ticker: &str, info: InfoBundle) -> Self {
        self.info.insert(ticker.to_string(), info);
        self
    }

    pub fn with_unreachable(mut self, ticker: &str) -> Self {
        self.unreachable.insert(ticker.to_string());
        self
    }

    fn check(&self, ticker: &str) -> Result<(), ProviderError> {
        if self.unreachable.contains(ticker) {
            return Err(ProviderError::NetworkUnreachable("connection refused".into()));
        }
        Ok(())
    }
}

impl MarketDataProvider for ScriptedProvider {
    fn fetch_table(
        &self,
        ticker: &str,
        kind: DataType,
    ) -> Result<Option<RawPayload>, ProviderError> {
        self.check(ticker)?;
        Ok(self.tables.get(&(ticker.to_string(), kind)).cloned())
    }

    fn fetch_info_bundle(&self, ticker: &str) -> Result<InfoBundle, ProviderError> {
        self.check(ticker)?;
        Ok(self.info.get(ticker).cloned().unwrap_or_default())
    }
}

/// Progress observer that keeps one line per event.
#[derive(Default)]
pub struct RecordingProgress {
    pub events: Mutex<Vec<String>>,
}

impl RecordingProgress {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    fn push(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }
}

impl IngestProgress for RecordingProgress {
    fn on_unit_start(&self, ticker: &str, kind: DataType, _index: usize, _total: usize) {
        self.push(format!("start {ticker} {kind}"));
    }

    fn on_schema_mismatch(&self, _ticker: &str, table: &str, report: &NormalizeReport) {
        for column in &report.dropped {
            self.push(format!("dropped {table}.{column}"));
        }
        for column in &report.added_null {
            self.push(format!("null {table}.{column}"));
        }
    }

    fn on_row_inserted(&self, key: &NaturalKey) {
        self.push(format!("added {} {} {}", key.table, key.ticker, key.report_date));
    }

    fn on_row_skipped(&self, key: &NaturalKey) {
        self.push(format!("skipped {} {} {}", key.table, key.ticker, key.report_date));
    }

    fn on_duplicate_check_failed(&self, key: &NaturalKey, _err: &StoreError) {
        self.push(format!("check failed {} {}", key.table, key.ticker));
    }

    fn on_unit_complete(
        &self,
        ticker: &str,
        kind: DataType,
        result: &Result<UnitOutcome, IngestError>,
    ) {
        let outcome = match result {
            Ok(UnitOutcome::Written(_)) => "ok",
            Ok(UnitOutcome::NoData) => "no data",
            Err(_) => "failed",
        };
        self.push(format!("done {ticker} {kind}: {outcome}"));
    }

    fn on_run_complete(&self, summary: &RunSummary) {
        self.push(format!("run {}/{}", summary.succeeded, summary.units));
    }
}

pub const SCHEMA: &str = "
    CREATE TABLE annual_income_statements (
        ticker TEXT NOT NULL,
        report_date DATE NOT NULL,
        total_revenue REAL
    );
    CREATE TABLE stock_metrics (
        ticker TEXT NOT NULL,
        report_date DATE NOT NULL,
        company_name TEXT,
        current_price REAL,
        beta REAL,
        recommendation_key TEXT
    );
    CREATE TABLE company_news (
        ticker TEXT NOT NULL,
        report_date DATE NOT NULL,
        title TEXT,
        publisher TEXT
    );
";

/// A fresh database with [`SCHEMA`] applied.
pub fn temp_store() -> (TempDir, SqliteStore) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("financial_data.db");
    Connection::open(&path).unwrap().execute_batch(SCHEMA).unwrap();
    let store = SqliteStore::connect(&path).unwrap();
    (dir, store)
}

pub fn count_rows(path: &Path, table: &str) -> i64 {
    Connection::open(path)
        .unwrap()
        .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0))
        .unwrap()
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// Annual income statement with `Total Revenue` and `Cost Of Revenue` rows.
pub fn income_statement(periods: &[(&str, f64, f64)]) -> RawPayload {
    let mut t = WideTable::new(periods.iter().map(|(d, _, _)| Scalar::from(*d)).collect());
    t.push_metric(
        "Total Revenue",
        periods.iter().map(|(_, rev, _)| Scalar::Float(*rev)).collect(),
    );
    t.push_metric(
        "Cost Of Revenue",
        periods.iter().map(|(_, _, cost)| Scalar::Float(*cost)).collect(),
    );
    RawPayload::Wide(t)
}

/// Wraps a real store, failing duplicate lookups and optionally the nth insert.
pub struct FlakyStore<'a> {
    pub inner: &'a SqliteStore,
    pub fail_lookups: bool,
    pub fail_insert_at: Option<usize>,
    pub inserts: Cell<usize>,
}

impl<'a> FlakyStore<'a> {
    pub fn new(inner: &'a SqliteStore) -> Self {
        Self {
            inner,
            fail_lookups: false,
            fail_insert_at: None,
            inserts: Cell::new(0),
        }
    }
}

impl Store for FlakyStore<'_> {
    fn columns_of(&self, table: &str) -> Result<Vec<String>, StoreError> {
        self.inner.columns_of(table)
    }

    fn exists(&self, key: &NaturalKey) -> Result<bool, StoreError> {
        if self.fail_lookups {
            return Err(StoreError::Query {
                table: key.table.clone(),
                message: "database is locked".into(),
            });
        }
        self.inner.exists(key)
    }

    fn insert(&self, table: &str, row: &NormalizedRow) -> Result<(), StoreError> {
        let n = self.inserts.get();
        if self.fail_insert_at == Some(n) {
            return Err(StoreError::Insert {
                table: table.to_string(),
                message: "disk I/O error".into(),
            });
        }
        self.inserts.set(n + 1);
        self.inner.insert(table, row)
    }
}
