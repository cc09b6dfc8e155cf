use super::Scalar;
use chrono::NaiveDate;

/// (ticker, report_date, table): at most one stored row per key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NaturalKey {
    pub ticker: String,
    pub report_date: NaiveDate,
    pub table: String,
}

/// A row shaped exactly like its destination table.
///
/// `cells` holds one entry per destination column, in the table's order. The
/// natural key fields are kept alongside so duplicate checks work even when the
/// destination happens not to define `ticker` or `report_date`.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRow {
    pub ticker: String,
    pub report_date: NaiveDate,
    pub cells: Vec<(String, Scalar)>,
}

impl NormalizedRow {
    pub fn key(&self, table: &str) -> NaturalKey {
        NaturalKey {
            ticker: self.ticker.clone(),
            report_date: self.report_date,
            table: table.to_string(),
        }
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(c, _)| c.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &Scalar> {
        self.cells.iter().map(|(_, v)| v)
    }

    pub fn get(&self, column: &str) -> Option<&Scalar> {
        self.cells.iter().find(|(c, _)| c == column).map(|(_, v)| v)
    }
}
