//! Record normalizer: provider-shaped payloads in, destination-shaped rows out.
//!
//! Every payload shape goes through the same stages:
//!
//! 1. stage — transpose wide tables, inject `ticker`, canonicalize names
//! 2. coerce `report_date` to a calendar date
//! 3. build a polars frame and reconcile it against the destination columns
//!    (drop unknown columns, add missing ones as nulls)
//! 4. select the destination columns in table order and read the rows back
//!
//! The output rows therefore carry exactly the destination column set, in the
//! destination order, whatever the payload looked like.

mod canonicalize;
pub mod frame;
mod report_date;

pub use canonicalize::canonical_name;
pub use report_date::coerce_report_date;

use crate::domain::{FlatRecord, NormalizedRow, RawPayload, RowTable, Scalar, WideTable};
use chrono::NaiveDate;
use polars::prelude::*;
use thiserror::Error;

pub const TICKER_COLUMN: &str = "ticker";
pub const REPORT_DATE_COLUMN: &str = "report_date";

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("destination table defines no columns")]
    EmptySchema,

    #[error("payload has no report_date column")]
    MissingReportDate,

    #[error("row {row}: cannot read '{label}' as a report date")]
    InvalidReportDate { row: usize, label: String },

    #[error("frame error: {0}")]
    Frame(#[from] PolarsError),
}

/// Columns that reconciliation removed or filled with nulls.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizeReport {
    /// Source columns with no destination counterpart (canonical names).
    pub dropped: Vec<String>,
    /// Destination columns the source did not provide.
    pub added_null: Vec<String>,
}

impl NormalizeReport {
    pub fn is_clean(&self) -> bool {
        self.dropped.is_empty() && self.added_null.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Normalized {
    pub rows: Vec<NormalizedRow>,
    pub report: NormalizeReport,
}

/// Converts a payload into rows shaped exactly like `destination`.
///
/// An empty payload yields no rows. A payload sharing no column names with the
/// destination still succeeds: its rows are all nulls except whatever of
/// `ticker`/`report_date` the destination defines.
pub fn normalize(
    ticker: &str,
    payload: &RawPayload,
    destination: &[String],
) -> Result<Normalized, NormalizeError> {
    if destination.is_empty() {
        return Err(NormalizeError::EmptySchema);
    }
    if payload.is_empty() {
        return Ok(Normalized::default());
    }

    let mut staged = match payload {
        RawPayload::Wide(table) => stage_wide(ticker, table),
        RawPayload::Rows(table) => stage_rows(ticker, table),
        RawPayload::Flat(record) => stage_flat(ticker, record),
    };
    let mut report = NormalizeReport {
        dropped: staged.canonicalize(),
        added_null: Vec::new(),
    };
    let dates = staged.coerce_report_dates()?;

    let mut df = staged.into_frame()?;
    let height = df.height();

    let extra: Vec<String> = df
        .get_column_names()
        .into_iter()
        .filter(|name| !destination.iter().any(|d| d == name.as_str()))
        .map(|name| name.to_string())
        .collect();
    for name in &extra {
        df = df.drop(name)?;
    }
    report.dropped.extend(extra);

    for name in destination {
        if df.column(name).is_err() {
            df.with_column(Column::full_null(name.as_str().into(), height, &DataType::Null))?;
            report.added_null.push(name.clone());
        }
    }

    let df = df.select(destination.iter().map(String::as_str))?;

    let mut rows = Vec::with_capacity(height);
    for (i, report_date) in dates.into_iter().enumerate() {
        let mut cells = Vec::with_capacity(destination.len());
        for column in df.get_columns() {
            cells.push((column.name().to_string(), frame::any_to_scalar(column.get(i)?)));
        }
        rows.push(NormalizedRow {
            ticker: ticker.to_string(),
            report_date,
            cells,
        });
    }

    Ok(Normalized { rows, report })
}

/// Column-major working copy of a payload.
struct Staged {
    names: Vec<String>,
    columns: Vec<Vec<Scalar>>,
}

impl Staged {
    fn with_capacity(n: usize) -> Self {
        Self {
            names: Vec::with_capacity(n),
            columns: Vec::with_capacity(n),
        }
    }

    fn push(&mut self, name: impl Into<String>, cells: Vec<Scalar>) {
        self.names.push(name.into());
        self.columns.push(cells);
    }

    /// Canonicalizes every name. Later columns whose canonical name is already
    /// taken are removed; their names are returned. A source `ticker` column is
    /// replaced by the injected one without being reported.
    fn canonicalize(&mut self) -> Vec<String> {
        let mut kept_names: Vec<String> = Vec::with_capacity(self.names.len());
        let mut kept_columns = Vec::with_capacity(self.columns.len());
        let mut collisions = Vec::new();

        for (name, cells) in self.names.drain(..).zip(self.columns.drain(..)) {
            let canonical = canonical_name(&name);
            if kept_names.contains(&canonical) {
                if canonical != TICKER_COLUMN {
                    collisions.push(canonical);
                }
            } else {
                kept_names.push(canonical);
                kept_columns.push(cells);
            }
        }

        self.names = kept_names;
        self.columns = kept_columns;
        collisions
    }

    fn coerce_report_dates(&mut self) -> Result<Vec<NaiveDate>, NormalizeError> {
        let idx = self
            .names
            .iter()
            .position(|n| n == REPORT_DATE_COLUMN)
            .ok_or(NormalizeError::MissingReportDate)?;

        let dates = self.columns[idx]
            .iter()
            .enumerate()
            .map(|(row, label)| {
                coerce_report_date(label).ok_or_else(|| NormalizeError::InvalidReportDate {
                    row,
                    label: label.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        self.columns[idx] = dates.iter().copied().map(Scalar::Date).collect();
        Ok(dates)
    }

    fn into_frame(self) -> Result<DataFrame, NormalizeError> {
        let columns = self
            .names
            .iter()
            .zip(&self.columns)
            .map(|(name, cells)| frame::scalar_column(name, cells))
            .collect::<PolarsResult<Vec<_>>>()?;
        Ok(DataFrame::new(columns)?)
    }
}

/// Transposes metrics-as-rows into one row per report period.
fn stage_wide(ticker: &str, table: &WideTable) -> Staged {
    let height = table.periods.len();
    let mut staged = Staged::with_capacity(table.metrics.len() + 2);
    staged.push(TICKER_COLUMN, vec![Scalar::from(ticker); height]);
    staged.push(REPORT_DATE_COLUMN, table.periods.clone());
    for (metric, values) in table.metrics.iter().zip(&table.values) {
        staged.push(metric.clone(), values.clone());
    }
    staged
}

fn stage_rows(ticker: &str, table: &RowTable) -> Staged {
    let height = table.rows.len();
    let mut staged = Staged::with_capacity(table.columns.len() + 2);
    staged.push(TICKER_COLUMN, vec![Scalar::from(ticker); height]);
    staged.push(REPORT_DATE_COLUMN, table.index.clone());
    for (c, name) in table.columns.iter().enumerate() {
        let cells = table
            .rows
            .iter()
            .map(|row| row.get(c).cloned().unwrap_or(Scalar::Null))
            .collect();
        staged.push(name.clone(), cells);
    }
    staged
}

/// A flat record is already one row; it must carry its own `report_date`.
fn stage_flat(ticker: &str, record: &FlatRecord) -> Staged {
    let mut staged = Staged::with_capacity(record.len() + 1);
    staged.push(TICKER_COLUMN, vec![Scalar::from(ticker)]);
    for (key, value) in &record.fields {
        staged.push(key.clone(), vec![value.clone()]);
    }
    staged
}
