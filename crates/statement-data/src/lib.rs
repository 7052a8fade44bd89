//! Data ingestion layer for the statement report.
//!
//! Responsible for discovering monthly bank-statement exports, locating their
//! header lines, normalizing the parsed tables, holding them in a per-month
//! store and aggregating them into yearly summaries.

pub mod aggregator;
pub mod analysis;
pub mod normalizer;
pub mod reader;
pub mod store;

pub use statement_core as core;
