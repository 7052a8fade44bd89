//! Shared types for the statement report.
//!
//! Holds the canonical column schema, the row and transaction value types,
//! the cell-level parsers (locale amounts, value dates, umlaut repair), CLI
//! settings, console formatting and the common error type.

pub mod data_processors;
pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;

pub use error::{Result, StatementError};
