//! Provider-shaped payloads, before normalization.

use super::Scalar;

/// Raw data for one (ticker, data type) unit, in whatever shape the provider uses.
#[derive(Debug, Clone, PartialEq)]
pub enum RawPayload {
    /// Metrics as rows, report periods as columns (financial statements).
    Wide(WideTable),
    /// One row per report date (actions, recommendations, news).
    Rows(RowTable),
    /// A single key/value record (stock metrics, earnings calendar).
    Flat(FlatRecord),
}

impl RawPayload {
    /// An empty payload means "no data available", not an error.
    pub fn is_empty(&self) -> bool {
        match self {
            RawPayload::Wide(t) => t.is_empty(),
            RawPayload::Rows(t) => t.is_empty(),
            RawPayload::Flat(r) => r.is_empty(),
        }
    }

    pub fn shape(&self) -> &'static str {
        match self {
            RawPayload::Wide(_) => "wide",
            RawPayload::Rows(_) => "rows",
            RawPayload::Flat(_) => "flat",
        }
    }
}

/// `values[m][p]` is metric `metrics[m]` for report period `periods[p]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WideTable {
    pub metrics: Vec<String>,
    pub periods: Vec<Scalar>,
    pub values: Vec<Vec<Scalar>>,
}

impl WideTable {
    pub fn new(periods: Vec<Scalar>) -> Self {
        Self {
            metrics: Vec::new(),
            periods,
            values: Vec::new(),
        }
    }

    /// Appends a metric row. Short rows are padded with nulls, long rows truncated.
    pub fn push_metric(&mut self, name: impl Into<String>, mut values: Vec<Scalar>) {
        values.resize(self.periods.len(), Scalar::Null);
        self.metrics.push(name.into());
        self.values.push(values);
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty() || self.periods.is_empty()
    }
}

/// `rows[r][c]` is column `columns[c]` for the row dated `index[r]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowTable {
    pub columns: Vec<String>,
    pub index: Vec<Scalar>,
    pub rows: Vec<Vec<Scalar>>,
}

impl RowTable {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            index: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// Appends a row. Short rows are padded with nulls, long rows truncated.
    pub fn push_row(&mut self, date: impl Into<Scalar>, mut values: Vec<Scalar>) {
        values.resize(self.columns.len(), Scalar::Null);
        self.index.push(date.into());
        self.rows.push(values);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Ordered key/value record; the first occurrence of a key wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlatRecord {
    pub fields: Vec<(String, Scalar)>,
}

impl FlatRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Scalar>) {
        let key = key.into();
        if self.get(&key).is_none() {
            self.fields.push((key, value.into()));
        }
    }

    pub fn get(&self, key: &str) -> Option<&Scalar> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
