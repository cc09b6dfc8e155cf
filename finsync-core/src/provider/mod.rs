//! Market data provider trait and structured error types.
//!
//! The `MarketDataProvider` trait abstracts over data sources so the pipeline can
//! run against Yahoo Finance in production and scripted fakes in tests. The
//! adapter layer sits above the trait; providers know nothing about tables.

pub mod adapter;
pub mod metrics;
pub mod yahoo;

pub use adapter::ProviderAdapter;
pub use yahoo::YahooProvider;

use crate::domain::{DataType, RawPayload, Scalar};
use std::collections::BTreeMap;
use thiserror::Error;

/// Structured error types for provider calls.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("authentication required: {0}")]
    AuthenticationRequired(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("HTTP {status} for {symbol}")]
    Http { status: u16, symbol: String },

    #[error("provider error: {0}")]
    Other(String),
}

/// The provider's flat "info" bundle: field name to value, in the provider's
/// own vocabulary (`currentPrice`, `trailingPE`, ...).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InfoBundle {
    pub fields: BTreeMap<String, Scalar>,
}

impl InfoBundle {
    pub fn get(&self, key: &str) -> Option<&Scalar> {
        self.fields.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Scalar) {
        self.fields.insert(key.into(), value);
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A source of raw market data.
///
/// One call is one attempt: implementations do not retry, cache or rate-limit.
pub trait MarketDataProvider: Send + Sync {
    /// Fetch the table for `kind`, in the provider's native shape.
    ///
    /// `Ok(None)` means the provider has nothing for this ticker and kind.
    fn fetch_table(&self, ticker: &str, kind: DataType)
        -> Result<Option<RawPayload>, ProviderError>;

    /// Fetch the flat info bundle for `ticker`. An empty bundle means no data.
    fn fetch_info_bundle(&self, ticker: &str) -> Result<InfoBundle, ProviderError>;
}
