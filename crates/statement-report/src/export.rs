//! Flat-file export of yearly summaries.

use std::path::{Path, PathBuf};

use anyhow::Context;
use csv::WriterBuilder;
use serde::Serialize;
use statement_core::models::CanonicalColumn;
use statement_data::aggregator::YearSummary;

/// One exported line: the row's index in its source file, then the canonical
/// columns in canonical order.
#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    index: usize,
    value_date: &'a str,
    category: &'a str,
    counterparty: &'a str,
    purpose: &'a str,
    amount: f64,
}

/// Path of the export for `year` inside `output_dir`.
pub fn output_path(output_dir: &Path, year: &str) -> PathBuf {
    output_dir.join(format!("{}_out.csv", year))
}

/// Write `summary.sorted_rows` to `<output_dir>/<year>_out.csv`.
///
/// The header's first cell is empty; it heads the index column.
pub fn write_year_csv(summary: &YearSummary, output_dir: &Path) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("creating {}", output_dir.display()))?;

    let path = output_path(output_dir, &summary.year);
    let mut wtr = WriterBuilder::new()
        .has_headers(false)
        .from_path(&path)
        .with_context(|| format!("opening {}", path.display()))?;

    wtr.write_record(std::iter::once("").chain(CanonicalColumn::ALL.iter().map(|c| c.header())))?;
    for row in &summary.sorted_rows {
        wtr.serialize(ExportRow {
            index: row.index,
            value_date: &row.value_date,
            category: &row.category,
            counterparty: &row.counterparty,
            purpose: &row.purpose,
            amount: row.amount,
        })?;
    }
    wtr.flush()?;

    Ok(path)
}
