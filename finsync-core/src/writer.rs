//! Persistence writer: one duplicate check and at most one insert per row.

use crate::domain::NormalizedRow;
use crate::progress::IngestProgress;
use crate::store::{Store, StoreError};
use thiserror::Error;

/// Per-call row counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteReport {
    pub inserted: usize,
    pub skipped_duplicates: usize,
    /// Rows whose duplicate lookup failed and were inserted anyway.
    pub duplicate_check_failures: usize,
}

/// An insert failed. Rows inserted before it stay in the store.
#[derive(Debug, Error)]
#[error("insert into '{table}' failed after {inserted} rows: {source}", inserted = .written.inserted)]
pub struct WriteError {
    pub table: String,
    pub written: WriteReport,
    pub source: StoreError,
}

/// Writes `rows` into `table`, skipping rows whose natural key already exists.
///
/// A failed duplicate lookup counts as "not a duplicate": the row is still
/// inserted. The first failed insert stops the call.
pub fn write_all(
    store: &dyn Store,
    table: &str,
    rows: &[NormalizedRow],
    progress: &dyn IngestProgress,
) -> Result<WriteReport, WriteError> {
    let mut report = WriteReport::default();

    for row in rows {
        let key = row.key(table);
        match store.exists(&key) {
            Ok(true) => {
                progress.on_row_skipped(&key);
                report.skipped_duplicates += 1;
                continue;
            }
            Ok(false) => {}
            Err(e) => {
                progress.on_duplicate_check_failed(&key, &e);
                report.duplicate_check_failures += 1;
            }
        }

        store.insert(table, row).map_err(|source| WriteError {
            table: table.to_string(),
            written: report,
            source,
        })?;
        progress.on_row_inserted(&key);
        report.inserted += 1;
    }

    Ok(report)
}
