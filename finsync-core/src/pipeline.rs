//! Pipeline orchestrator: every (ticker, data type) unit through
//! fetch → introspect → normalize → write.

use crate::domain::DataType;
use crate::error::IngestError;
use crate::normalize::normalize;
use crate::progress::IngestProgress;
use crate::provider::{MarketDataProvider, ProviderAdapter};
use crate::store::Store;
use crate::writer::{write_all, WriteReport};
use chrono::{Local, NaiveDate};

/// How a unit that did not fail ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitOutcome {
    Written(WriteReport),
    /// The provider had nothing for this ticker and data type.
    NoData,
}

/// Summary of a pipeline run.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub units: usize,
    pub succeeded: usize,
    pub no_data: usize,
    pub failed: usize,
    pub rows_inserted: usize,
    pub rows_skipped: usize,
    pub failures: Vec<(String, DataType, IngestError)>,
}

impl RunSummary {
    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }

    fn record(&mut self, ticker: &str, kind: DataType, result: Result<UnitOutcome, IngestError>) {
        match result {
            Ok(UnitOutcome::Written(report)) => {
                self.succeeded += 1;
                self.rows_inserted += report.inserted;
                self.rows_skipped += report.skipped_duplicates;
            }
            Ok(UnitOutcome::NoData) => self.no_data += 1,
            Err(IngestError::Write(err)) => {
                // Rows written before the failure are in the store.
                self.rows_inserted += err.written.inserted;
                self.rows_skipped += err.written.skipped_duplicates;
                self.failed += 1;
                self.failures.push((ticker.to_string(), kind, IngestError::Write(err)));
            }
            Err(err) => {
                self.failed += 1;
                self.failures.push((ticker.to_string(), kind, err));
            }
        }
    }
}

/// Unit order for one ticker: duplicates removed, stock metrics first, the
/// rest in request order.
pub fn plan(data_types: &[DataType]) -> Vec<DataType> {
    let mut plan: Vec<DataType> = Vec::with_capacity(data_types.len());
    if data_types.contains(&DataType::StockMetrics) {
        plan.push(DataType::StockMetrics);
    }
    for &kind in data_types {
        if !plan.contains(&kind) {
            plan.push(kind);
        }
    }
    plan
}

pub struct Pipeline<'a> {
    adapter: ProviderAdapter<'a>,
    store: &'a dyn Store,
    progress: &'a dyn IngestProgress,
    as_of: NaiveDate,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        provider: &'a dyn MarketDataProvider,
        store: &'a dyn Store,
        progress: &'a dyn IngestProgress,
    ) -> Self {
        Self {
            adapter: ProviderAdapter::new(provider),
            store,
            progress,
            as_of: Local::now().date_naive(),
        }
    }

    /// Date stamped on snapshot records (stock metrics). Defaults to today.
    pub fn with_as_of(mut self, as_of: NaiveDate) -> Self {
        self.as_of = as_of;
        self
    }

    /// Runs every unit in order. A failed unit is recorded and the run moves on.
    pub fn run(&self, tickers: &[String], data_types: &[DataType]) -> RunSummary {
        let plan = plan(data_types);
        let total = tickers.len() * plan.len();
        let mut summary = RunSummary {
            units: total,
            ..Default::default()
        };

        let mut index = 0;
        for ticker in tickers {
            for &kind in &plan {
                self.progress.on_unit_start(ticker, kind, index, total);
                let result = self.run_unit(ticker, kind);
                self.progress.on_unit_complete(ticker, kind, &result);
                summary.record(ticker, kind, result);
                index += 1;
            }
        }

        self.progress.on_run_complete(&summary);
        summary
    }

    /// Processes a single unit.
    pub fn run_unit(&self, ticker: &str, kind: DataType) -> Result<UnitOutcome, IngestError> {
        let Some(payload) = self.adapter.fetch(ticker, kind, self.as_of)? else {
            return Ok(UnitOutcome::NoData);
        };

        let table = self.adapter.table_name_for(kind);
        let columns = self.store.columns_of(table)?;
        if columns.is_empty() {
            return Err(IngestError::SchemaUnavailable {
                table: table.to_string(),
            });
        }

        let normalized = normalize(ticker, &payload, &columns)?;
        if !normalized.report.is_clean() {
            self.progress.on_schema_mismatch(ticker, table, &normalized.report);
        }

        let report = write_all(self.store, table, &normalized.rows, self.progress)?;
        Ok(UnitOutcome::Written(report))
    }
}
