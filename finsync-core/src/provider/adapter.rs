//! Maps data type identifiers onto provider calls and destination tables.

use super::metrics::stock_metrics_record;
use super::{MarketDataProvider, ProviderError};
use crate::domain::{DataType, RawPayload};
use chrono::NaiveDate;
use tracing::debug;

/// Thin layer between the pipeline and a [`MarketDataProvider`].
///
/// Empty payloads are folded into `None` here so the pipeline only ever sees
/// "data", "no data" or an error.
pub struct ProviderAdapter<'a> {
    provider: &'a dyn MarketDataProvider,
}

impl<'a> ProviderAdapter<'a> {
    pub fn new(provider: &'a dyn MarketDataProvider) -> Self {
        Self { provider }
    }

    /// Raw payload for one (ticker, data type) unit.
    ///
    /// Stock metrics are assembled from the info bundle and dated `as_of`.
    pub fn fetch(
        &self,
        ticker: &str,
        kind: DataType,
        as_of: NaiveDate,
    ) -> Result<Option<RawPayload>, ProviderError> {
        if kind == DataType::StockMetrics {
            return self.stock_metrics(ticker, as_of);
        }

        let payload = self.provider.fetch_table(ticker, kind)?;
        match payload {
            Some(p) if !p.is_empty() => {
                debug!(ticker, data_type = %kind, shape = p.shape(), "fetched payload");
                Ok(Some(p))
            }
            _ => Ok(None),
        }
    }

    /// Single-row stock metrics snapshot, or `None` when the provider has no
    /// info for `ticker`.
    pub fn stock_metrics(
        &self,
        ticker: &str,
        as_of: NaiveDate,
    ) -> Result<Option<RawPayload>, ProviderError> {
        let info = self.provider.fetch_info_bundle(ticker)?;
        Ok(stock_metrics_record(ticker, as_of, &info).map(RawPayload::Flat))
    }

    pub fn table_name_for(&self, kind: DataType) -> &'static str {
        kind.table_name()
    }
}
