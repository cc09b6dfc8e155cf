//! Progress reporting for ingestion runs.
//!
//! The pipeline and writer report every user-facing progress line through
//! [`IngestProgress`]; lower layers only emit `debug` traces.

use crate::domain::{DataType, NaturalKey};
use crate::error::IngestError;
use crate::normalize::NormalizeReport;
use crate::pipeline::{RunSummary, UnitOutcome};
use crate::store::StoreError;
use tracing::{error, info, warn};

/// Progress callback for ingestion runs.
pub trait IngestProgress: Send {
    /// Called when starting a (ticker, data type) unit.
    fn on_unit_start(&self, ticker: &str, kind: DataType, index: usize, total: usize);

    /// Called when reconciliation dropped source columns or null-filled
    /// destination columns.
    fn on_schema_mismatch(&self, ticker: &str, table: &str, report: &NormalizeReport);

    fn on_row_inserted(&self, key: &NaturalKey);

    fn on_row_skipped(&self, key: &NaturalKey);

    /// The duplicate lookup failed; the row is inserted anyway.
    fn on_duplicate_check_failed(&self, key: &NaturalKey, err: &StoreError);

    fn on_unit_complete(
        &self,
        ticker: &str,
        kind: DataType,
        result: &Result<UnitOutcome, IngestError>,
    );

    fn on_run_complete(&self, summary: &RunSummary);
}

/// Reports progress through `tracing`.
pub struct LogProgress;

impl IngestProgress for LogProgress {
    fn on_unit_start(&self, ticker: &str, kind: DataType, index: usize, total: usize) {
        info!("[{}/{}] processing {kind} for {ticker}", index + 1, total);
    }

    fn on_schema_mismatch(&self, ticker: &str, table: &str, report: &NormalizeReport) {
        if !report.dropped.is_empty() {
            warn!(
                ticker,
                table,
                columns = %report.dropped.join(", "),
                "dropped columns not in destination table"
            );
        }
        if !report.added_null.is_empty() {
            warn!(
                ticker,
                table,
                columns = %report.added_null.join(", "),
                "destination columns missing from source, set to null"
            );
        }
    }

    fn on_row_inserted(&self, key: &NaturalKey) {
        info!(table = %key.table, "added {} {}", key.ticker, key.report_date);
    }

    fn on_row_skipped(&self, key: &NaturalKey) {
        info!(table = %key.table, "skipped duplicate {} {}", key.ticker, key.report_date);
    }

    fn on_duplicate_check_failed(&self, key: &NaturalKey, err: &StoreError) {
        warn!(
            table = %key.table,
            "duplicate check failed for {} {}, inserting anyway: {err}",
            key.ticker,
            key.report_date
        );
    }

    fn on_unit_complete(
        &self,
        ticker: &str,
        kind: DataType,
        result: &Result<UnitOutcome, IngestError>,
    ) {
        match result {
            Ok(UnitOutcome::Written(report)) => info!(
                ticker,
                data_type = %kind,
                inserted = report.inserted,
                skipped = report.skipped_duplicates,
                "unit complete"
            ),
            Ok(UnitOutcome::NoData) if kind == DataType::StockMetrics => {
                info!(ticker, "no metrics found")
            }
            Ok(UnitOutcome::NoData) => info!(ticker, data_type = %kind, "no data found"),
            Err(e) => error!(ticker, data_type = %kind, "unit failed: {e}"),
        }
    }

    fn on_run_complete(&self, summary: &RunSummary) {
        info!(
            "run complete: {}/{} units succeeded, {} without data, {} failed; {} rows added, {} duplicates skipped",
            summary.succeeded,
            summary.units,
            summary.no_data,
            summary.failed,
            summary.rows_inserted,
            summary.rows_skipped
        );
    }
}
