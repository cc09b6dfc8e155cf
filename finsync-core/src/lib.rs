//! FinSync Core — ingestion of financial statements and stock metrics into a
//! relational store.
//!
//! - Domain types (data type identifiers, scalars, raw payloads, normalized rows)
//! - Provider adapter and the Yahoo Finance provider
//! - Record normalizer: transpose, canonicalize, reconcile against the
//!   destination schema
//! - Relational store: schema introspection, duplicate lookup, single-row insert
//! - Persistence writer and the pipeline orchestrator

pub mod config;
pub mod domain;
pub mod error;
pub mod normalize;
pub mod pipeline;
pub mod progress;
pub mod provider;
pub mod store;
pub mod writer;

pub use config::IngestConfig;
pub use error::IngestError;
pub use pipeline::{Pipeline, RunSummary, UnitOutcome};
pub use progress::{IngestProgress, LogProgress};
