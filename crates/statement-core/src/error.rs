use std::path::PathBuf;
use thiserror::Error;

/// All errors produced while building a statement report.
#[derive(Error, Debug)]
pub enum StatementError {
    /// The configured input path does not point at a directory.
    #[error("Input path is not a directory: {0}")]
    NotADirectory(PathBuf),

    /// A statement file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The delimited parse of a statement file failed.
    #[error("Failed to parse CSV in {path}: {source}")]
    CsvParse {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A required canonical column is absent from a parsed table.
    #[error("Missing column '{column}' in {path}")]
    MissingColumn { path: PathBuf, column: String },

    /// An amount cell could not be coerced to a number.
    #[error("Invalid amount '{value}' in row {row} of {path}")]
    AmountParse {
        path: PathBuf,
        row: usize,
        value: String,
    },

    /// A value-date cell did not match any recognised date format.
    #[error("Invalid date format: {0}")]
    DateParse(String),

    /// Aggregation was requested for a year without any loaded month.
    #[error("No loaded months for year {0}")]
    EmptyYear(String),

    /// A load targeted a (year, month) pair that was never registered.
    #[error("No batch registered for {year}-{month}")]
    BatchNotRegistered { year: String, month: String },

    /// Pass-through for CSV errors that do not carry a path (e.g. export).
    #[error(transparent)]
    Csv(#[from] csv::Error),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the statement crates.
pub type Result<T> = std::result::Result<T, StatementError>;
