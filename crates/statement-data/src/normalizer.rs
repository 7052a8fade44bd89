//! Turns a [`RawTable`] into canonical [`StatementRow`]s.
//!
//! Columns outside the canonical five are pruned, the long counterparty and
//! amount headers are renamed, U+FFFD umlaut artifacts are repaired in every
//! kept cell and the amount column is coerced from its German locale form.

use statement_core::data_processors::{AmountProcessor, EncodingRepair};
use statement_core::error::{Result, StatementError};
use statement_core::models::{CanonicalColumn, StatementRow};
use tracing::debug;

use crate::reader::RawTable;

/// Stateless normalizer for raw statement tables.
pub struct RecordNormalizer;

impl RecordNormalizer {
    /// Normalize every row of `table`.
    ///
    /// Fails with [`StatementError::MissingColumn`] when a canonical column has
    /// no source header, and with [`StatementError::AmountParse`] on the first
    /// amount cell that cannot be coerced. No rows are added or dropped.
    pub fn normalize(table: &RawTable) -> Result<Vec<StatementRow>> {
        let positions = Self::column_positions(table)?;
        let dropped = table.headers.len().saturating_sub(positions.len());
        debug!(
            "Normalizing {} rows from {} ({} columns pruned)",
            table.rows.len(),
            table.source.display(),
            dropped
        );

        table
            .rows
            .iter()
            .enumerate()
            .map(|(index, row)| -> Result<StatementRow> {
                let cell = |col: CanonicalColumn| -> String {
                    let pos = positions[col as usize];
                    let raw = row.get(pos).map(String::as_str).unwrap_or("");
                    EncodingRepair::repair(raw).into_owned()
                };

                let amount_cell = cell(CanonicalColumn::Amount);
                let amount =
                    AmountProcessor::parse(&amount_cell).ok_or_else(|| StatementError::AmountParse {
                        path: table.source.clone(),
                        row: index,
                        value: amount_cell.clone(),
                    })?;

                Ok(StatementRow {
                    index,
                    value_date: cell(CanonicalColumn::ValueDate),
                    category: cell(CanonicalColumn::Category),
                    counterparty: cell(CanonicalColumn::Counterparty),
                    purpose: cell(CanonicalColumn::Purpose),
                    amount,
                })
            })
            .collect()
    }

    /// Source position of each canonical column, in canonical order.
    ///
    /// The first header matching a column wins.
    fn column_positions(table: &RawTable) -> Result<Vec<usize>> {
        CanonicalColumn::ALL
            .into_iter()
            .map(|col| {
                table
                    .headers
                    .iter()
                    .position(|h| CanonicalColumn::from_source_header(h) == Some(col))
                    .ok_or_else(|| StatementError::MissingColumn {
                        path: table.source.clone(),
                        column: col.header().to_string(),
                    })
            })
            .collect()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use statement_core::formatting::format_number;
    use std::path::PathBuf;

    fn raw(headers: &[&str], rows: &[&[&str]]) -> RawTable {
        RawTable {
            source: PathBuf::from("2021_01.csv"),
            headers: headers.iter().map(|s| s.to_string()).collect(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        }
    }

    fn bank_export() -> RawTable {
        raw(
            &[
                "Buchungstag",
                "Wertstellung",
                "Buchungstext",
                "Auftraggeber / Beg\u{FFFD}nstigter",
                "Verwendungszweck",
                "Kontonummer",
                "BLZ",
                "Betrag (EUR)",
                "",
            ],
            &[
                &[
                    "04.01.2021",
                    "04.01.2021",
                    "\u{FFFD}berweisung",
                    "M\u{FFFD}ller",
                    "Miete",
                    "DE11",
                    "100",
                    "-1.250,00",
                    "",
                ],
                &[
                    "05.01.2021",
                    "05.01.2021",
                    "Gutschrift",
                    "Arbeitgeber AG",
                    "Gehalt",
                    "DE22",
                    "200",
                    "2.500,55",
                    "",
                ],
            ],
        )
    }

    /// Render normalized rows back into a raw table under canonical headers.
    fn to_raw(rows: &[StatementRow]) -> RawTable {
        RawTable {
            source: PathBuf::from("2021_01.csv"),
            headers: CanonicalColumn::ALL
                .iter()
                .map(|c| c.header().to_string())
                .collect(),
            rows: rows
                .iter()
                .map(|r| {
                    vec![
                        r.value_date.clone(),
                        r.category.clone(),
                        r.counterparty.clone(),
                        r.purpose.clone(),
                        format_number(r.amount, 2),
                    ]
                })
                .collect(),
        }
    }

    #[test]
    fn test_normalize_prunes_and_renames() {
        let rows = RecordNormalizer::normalize(&bank_export()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].value_date, "05.01.2021");
        assert_eq!(rows[1].category, "Gutschrift");
        assert_eq!(rows[1].counterparty, "Arbeitgeber AG");
        assert_eq!(rows[1].purpose, "Gehalt");
        assert!((rows[1].amount - 2500.55).abs() < 1e-9);
    }

    #[test]
    fn test_normalize_repairs_encoding() {
        let rows = RecordNormalizer::normalize(&bank_export()).unwrap();
        assert_eq!(rows[0].category, "Ueberweisung");
        assert_eq!(rows[0].counterparty, "Mueller");
    }

    #[test]
    fn test_normalize_keeps_row_count_and_indices() {
        let rows = RecordNormalizer::normalize(&bank_export()).unwrap();
        let indices: Vec<usize> = rows.iter().map(|r| r.index).collect();
        assert_eq!(indices, vec![0, 1]);
    }

    #[test]
    fn test_normalize_column_order_independent() {
        let table = raw(
            &[
                "Betrag (EUR)",
                "Extra",
                "Verwendungszweck",
                "Auftraggeber / Begünstigter",
                "Buchungstext",
                "Wertstellung",
            ],
            &[&["-5,00", "x", "Kaffee", "Bäckerei", "Kartenzahlung", "02.02.2021"]],
        );
        let rows = RecordNormalizer::normalize(&table).unwrap();
        assert_eq!(rows[0].value_date, "02.02.2021");
        assert_eq!(rows[0].counterparty, "Bäckerei");
        assert!((rows[0].amount + 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_normalize_missing_column() {
        let table = raw(&["Wertstellung", "Buchungstext"], &[&["01.01.2021", "x"]]);
        let err = RecordNormalizer::normalize(&table).unwrap_err();
        assert!(matches!(
            err,
            StatementError::MissingColumn { ref column, .. } if column == "Auftraggeber"
        ));
    }

    #[test]
    fn test_normalize_bad_amount_is_fatal() {
        let mut table = bank_export();
        table.rows[1][7] = "n/a".to_string();
        let err = RecordNormalizer::normalize(&table).unwrap_err();
        assert!(matches!(
            err,
            StatementError::AmountParse { row: 1, ref value, .. } if value == "n/a"
        ));
    }

    #[test]
    fn test_normalize_short_row_reads_missing_amount_as_error() {
        let mut table = bank_export();
        table.rows[0].truncate(3);
        assert!(RecordNormalizer::normalize(&table).is_err());
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let once = RecordNormalizer::normalize(&bank_export()).unwrap();
        let twice = RecordNormalizer::normalize(&to_raw(&once)).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_normalize_empty_table() {
        let table = raw(
            &[
                "Wertstellung",
                "Buchungstext",
                "Auftraggeber",
                "Verwendungszweck",
                "Betrag",
            ],
            &[],
        );
        assert!(RecordNormalizer::normalize(&table).unwrap().is_empty());
    }
}
