//! Owned index of monthly statement batches keyed by (year, month).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use statement_core::error::{Result, StatementError};
use statement_core::models::{StatementRow, Transaction};
use statement_core::settings::DEFAULT_HEADER_TOKEN;
use tracing::{debug, info};

use crate::normalizer::RecordNormalizer;
use crate::reader::{header_offset, parse_raw_table, read_statement_text};

// ── MonthlyBatch ──────────────────────────────────────────────────────────────

/// One month's export and, once loaded, its normalized rows.
#[derive(Debug, Clone)]
pub struct MonthlyBatch {
    pub year: String,
    pub month: String,
    pub file_path: PathBuf,
    /// Header line index found during load; `None` until loaded or when the
    /// marker token was absent.
    pub header_skip: Option<usize>,
    table: Option<Vec<StatementRow>>,
}

impl MonthlyBatch {
    fn new(year: &str, month: &str, file_path: PathBuf) -> Self {
        Self {
            year: year.to_string(),
            month: month.to_string(),
            file_path,
            header_skip: None,
            table: None,
        }
    }

    /// Normalized rows, available after a successful load.
    pub fn table(&self) -> Option<&[StatementRow]> {
        self.table.as_deref()
    }

    pub fn is_loaded(&self) -> bool {
        self.table.is_some()
    }
}

// ── MonthlyBatchStore ─────────────────────────────────────────────────────────

/// Batches indexed by year, then month. Both levels iterate in key order.
#[derive(Debug, Clone)]
pub struct MonthlyBatchStore {
    header_token: String,
    batches: BTreeMap<String, BTreeMap<String, MonthlyBatch>>,
}

impl Default for MonthlyBatchStore {
    fn default() -> Self {
        Self::new(DEFAULT_HEADER_TOKEN)
    }
}

impl MonthlyBatchStore {
    /// Create an empty store whose loads look for `header_token`.
    pub fn new(header_token: impl Into<String>) -> Self {
        Self {
            header_token: header_token.into(),
            batches: BTreeMap::new(),
        }
    }

    /// Ensure an entry exists for (`year`, `month`) pointing at `file_path`.
    ///
    /// Registering a key again overwrites its path. A loaded table that came
    /// from a different path is discarded so it cannot outlive its source.
    pub fn register(&mut self, year: &str, month: &str, file_path: impl Into<PathBuf>) {
        let file_path = file_path.into();
        let batch = self
            .batches
            .entry(year.to_string())
            .or_default()
            .entry(month.to_string())
            .or_insert_with(|| MonthlyBatch::new(year, month, file_path.clone()));

        if batch.file_path != file_path {
            debug!(
                "Re-registering {}-{}: {} replaces {}",
                year,
                month,
                file_path.display(),
                batch.file_path.display()
            );
            batch.table = None;
            batch.header_skip = None;
        }
        batch.file_path = file_path;
        batch.year = year.to_string();
        batch.month = month.to_string();
    }

    /// Look up the entry for (`year`, `month`).
    pub fn get(&self, year: &str, month: &str) -> Option<&MonthlyBatch> {
        self.batches.get(year)?.get(month)
    }

    /// Locate the header, parse, normalize and validate the registered file,
    /// then attach the rows to the entry. Returns the number of rows loaded.
    ///
    /// Any earlier table is dropped first, so on error the entry is unloaded.
    pub fn load(&mut self, year: &str, month: &str) -> Result<usize> {
        let token = &self.header_token;
        let batch = self
            .batches
            .get_mut(year)
            .and_then(|months| months.get_mut(month))
            .ok_or_else(|| StatementError::BatchNotRegistered {
                year: year.to_string(),
                month: month.to_string(),
            })?;

        batch.table = None;
        batch.header_skip = None;
        let (header_skip, rows) = load_statement(&batch.file_path, token)?;
        let count = rows.len();
        batch.header_skip = header_skip;
        batch.table = Some(rows);

        info!(
            "Loaded {} rows for {}-{} from {}",
            count,
            year,
            month,
            batch.file_path.display()
        );
        Ok(count)
    }

    /// Year keys present in the store, ascending.
    pub fn all_years(&self) -> impl Iterator<Item = &str> + '_ {
        self.batches.keys().map(String::as_str)
    }

    /// Every entry registered for `year`, in month order.
    pub fn months(&self, year: &str) -> impl Iterator<Item = &MonthlyBatch> + '_ {
        self.batches
            .get(year)
            .into_iter()
            .flat_map(|months| months.values())
    }

    /// Every (year, month) key, in order.
    pub fn keys(&self) -> Vec<(String, String)> {
        self.batches
            .iter()
            .flat_map(|(year, months)| months.keys().map(move |m| (year.clone(), m.clone())))
            .collect()
    }

    /// Total number of registered entries.
    pub fn len(&self) -> usize {
        self.batches.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The per-file pipeline: header scan, raw parse, normalization, and a typed
/// pass over every row so bad value dates fail the file here rather than
/// during aggregation.
fn load_statement(path: &Path, token: &str) -> Result<(Option<usize>, Vec<StatementRow>)> {
    let text = read_statement_text(path)?;
    let header_skip = header_offset(&text, token, path);

    let raw = parse_raw_table(&text, header_skip, path)?;
    let rows = RecordNormalizer::normalize(&raw)?;
    for row in &rows {
        Transaction::from_row(row)?;
    }

    Ok((header_skip, rows))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
