use crate::normalize::NormalizeError;
use crate::provider::ProviderError;
use crate::store::StoreError;
use crate::writer::WriteError;
use thiserror::Error;

/// Why one (ticker, data type) unit failed. Never fatal to the run.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("schema for '{table}' is unavailable")]
    SchemaUnavailable { table: String },

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("normalization failed: {0}")]
    Normalize(#[from] NormalizeError),

    #[error(transparent)]
    Write(#[from] WriteError),
}
