//! Yearly aggregation over loaded monthly batches.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use statement_core::error::{Result, StatementError};
use statement_core::models::{StatementRow, Transaction};
use tracing::debug;

use crate::store::MonthlyBatchStore;

// ── YearSummary ───────────────────────────────────────────────────────────────

/// Everything derived from one year's statements.
#[derive(Debug, Clone)]
pub struct YearSummary {
    pub year: String,
    /// Months that contributed rows, ascending.
    pub months: Vec<String>,
    /// Sum of amounts per exact counterparty string.
    pub by_counterparty: BTreeMap<String, f64>,
    /// Sum of amounts per booking text.
    pub by_category: BTreeMap<String, f64>,
    pub year_total: f64,
    /// Sum of positive amounts.
    pub income: f64,
    /// Sum of negative amounts (itself negative).
    pub expenses: f64,
    /// All rows of the year ordered by value date; equal dates keep input
    /// order.
    pub sorted_rows: Vec<StatementRow>,
}

impl YearSummary {
    pub fn transaction_count(&self) -> usize {
        self.sorted_rows.len()
    }

    /// Counterparties ordered by total, largest outflow first.
    pub fn counterparties_by_total(&self) -> Vec<(&str, f64)> {
        sorted_by_total(&self.by_counterparty)
    }

    /// Categories ordered by total, largest outflow first.
    pub fn categories_by_total(&self) -> Vec<(&str, f64)> {
        sorted_by_total(&self.by_category)
    }
}

fn sorted_by_total(map: &BTreeMap<String, f64>) -> Vec<(&str, f64)> {
    let mut out: Vec<(&str, f64)> = map.iter().map(|(k, v)| (k.as_str(), *v)).collect();
    out.sort_by(|a, b| a.1.total_cmp(&b.1));
    out
}

// ── YearAggregator ────────────────────────────────────────────────────────────

/// Stateless helper that combines a year's monthly tables.
pub struct YearAggregator;

impl YearAggregator {
    /// Aggregate every loaded month of `year` held in `store`.
    ///
    /// Months whose load failed or never ran are ignored. Fails with
    /// [`StatementError::EmptyYear`] when no month of `year` is loaded.
    pub fn aggregate(store: &MonthlyBatchStore, year: &str) -> Result<YearSummary> {
        let loaded: Vec<(&str, &[StatementRow])> = store
            .months(year)
            .filter_map(|batch| batch.table().map(|t| (batch.month.as_str(), t)))
            .collect();

        if loaded.is_empty() {
            return Err(StatementError::EmptyYear(year.to_string()));
        }

        Self::aggregate_tables(year, loaded)
    }

    /// Aggregate every year in `store`, one result per year in key order.
    pub fn aggregate_all(store: &MonthlyBatchStore) -> Vec<(String, Result<YearSummary>)> {
        store
            .all_years()
            .map(|year| (year.to_string(), Self::aggregate(store, year)))
            .collect()
    }

    /// Concatenate `(month, rows)` tables in the given order, sort by value
    /// date and compute totals.
    ///
    /// Rows are never deduplicated: identical rows from two months count
    /// twice. Fails with [`StatementError::EmptyYear`] when `tables` is empty
    /// and with [`StatementError::DateParse`] when a value date is invalid.
    pub fn aggregate_tables<'a, I>(year: &str, tables: I) -> Result<YearSummary>
    where
        I: IntoIterator<Item = (&'a str, &'a [StatementRow])>,
    {
        let mut months = Vec::new();
        let mut dated: Vec<(NaiveDate, &StatementRow)> = Vec::new();

        for (month, rows) in tables {
            months.push(month.to_string());
            for row in rows {
                let txn = Transaction::from_row(row)?;
                dated.push((txn.value_date, row));
            }
        }

        if months.is_empty() {
            return Err(StatementError::EmptyYear(year.to_string()));
        }

        // Stable: equal dates keep concatenation order.
        dated.sort_by_key(|(date, _)| *date);

        let mut summary = YearSummary {
            year: year.to_string(),
            months,
            by_counterparty: BTreeMap::new(),
            by_category: BTreeMap::new(),
            year_total: 0.0,
            income: 0.0,
            expenses: 0.0,
            sorted_rows: Vec::with_capacity(dated.len()),
        };

        for (_, row) in dated {
            summary.year_total += row.amount;
            if row.amount >= 0.0 {
                summary.income += row.amount;
            } else {
                summary.expenses += row.amount;
            }
            *summary
                .by_counterparty
                .entry(row.counterparty.clone())
                .or_default() += row.amount;
            *summary
                .by_category
                .entry(row.category.clone())
                .or_default() += row.amount;
            summary.sorted_rows.push(row.clone());
        }

        debug!(
            "Year {}: {} rows from {} months, total {:.2}",
            summary.year,
            summary.sorted_rows.len(),
            summary.months.len(),
            summary.year_total
        );

        Ok(summary)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::Path;
    use tempfile::TempDir;

    fn row(index: usize, date: &str, category: &str, counterparty: &str, amount: f64) -> StatementRow {
        StatementRow {
            index,
            value_date: date.to_string(),
            category: category.to_string(),
            counterparty: counterparty.to_string(),
            purpose: format!("purpose {}", index),
            amount,
        }
    }

    fn january() -> Vec<StatementRow> {
        vec![
            row(0, "15.01.2021", "Lastschrift", "Stadtwerke", -54.30),
            row(1, "01.01.2021", "Gutschrift", "Arbeitgeber AG", 2500.00),
            row(2, "20.01.2021", "Kartenzahlung", "Bäckerei", -3.20),
        ]
    }

    fn february() -> Vec<StatementRow> {
        vec![
            row(0, "15.02.2021", "Lastschrift", "Stadtwerke", -54.30),
            row(1, "01.02.2021", "Gutschrift", "Arbeitgeber AG", 2500.00),
            row(2, "03.02.2021", "Kartenzahlung", "Bäckerei", 0.0),
        ]
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_year_total_sums_every_month() {
        let jan = january();
        let feb = february();
        let summary =
            YearAggregator::aggregate_tables("2021", [("01", &jan[..]), ("02", &feb[..])]).unwrap();

        let expected: f64 = jan.iter().chain(feb.iter()).map(|r| r.amount).sum();
        assert!(approx(summary.year_total, expected));
        assert_eq!(summary.transaction_count(), 6);
        assert_eq!(summary.months, vec!["01", "02"]);
    }

    #[test]
    fn test_groupings_partition_total() {
        let jan = january();
        let feb = february();
        let summary =
            YearAggregator::aggregate_tables("2021", [("01", &jan[..]), ("02", &feb[..])]).unwrap();

        let by_cp: f64 = summary.by_counterparty.values().sum();
        let by_cat: f64 = summary.by_category.values().sum();
        assert!(approx(by_cp, summary.year_total));
        assert!(approx(by_cat, summary.year_total));
        assert!(approx(summary.income + summary.expenses, summary.year_total));
        assert!(approx(summary.by_counterparty["Stadtwerke"], -108.60));
        assert!(approx(summary.by_category["Gutschrift"], 5000.0));
    }

    #[test]
    fn test_sorted_by_value_date() {
        let jan = january();
        let feb = february();
        // Feed February first to prove ordering comes from dates.
        let summary =
            YearAggregator::aggregate_tables("2021", [("02", &feb[..]), ("01", &jan[..])]).unwrap();

        let dates: Vec<&str> = summary
            .sorted_rows
            .iter()
            .map(|r| r.value_date.as_str())
            .collect();
        assert_eq!(
            dates,
            vec![
                "01.01.2021",
                "15.01.2021",
                "20.01.2021",
                "01.02.2021",
                "03.02.2021",
                "15.02.2021"
            ]
        );
    }

    #[test]
    fn test_sort_is_stable_for_equal_dates() {
        let a = vec![
            row(0, "05.03.2021", "Lastschrift", "first", -1.0),
            row(1, "01.03.2021", "Lastschrift", "early", -1.0),
            row(2, "05.03.2021", "Lastschrift", "second", -1.0),
        ];
        let b = vec![row(0, "05.03.2021", "Lastschrift", "third", -1.0)];
        let summary =
            YearAggregator::aggregate_tables("2021", [("03", &a[..]), ("03b", &b[..])]).unwrap();

        let order: Vec<&str> = summary
            .sorted_rows
            .iter()
            .map(|r| r.counterparty.as_str())
            .collect();
        assert_eq!(order, vec!["early", "first", "second", "third"]);
    }

    #[test]
    fn test_duplicates_across_months_count_twice() {
        let jan = vec![row(0, "31.01.2021", "Lastschrift", "Versicherung", -100.0)];
        let summary =
            YearAggregator::aggregate_tables("2021", [("01", &jan[..]), ("02", &jan[..])]).unwrap();
        assert!(approx(summary.year_total, -200.0));
        assert_eq!(summary.transaction_count(), 2);
    }

    #[test]
    fn test_empty_tables_is_error() {
        let err = YearAggregator::aggregate_tables("2021", Vec::<(&str, &[StatementRow])>::new())
            .unwrap_err();
        assert!(matches!(err, StatementError::EmptyYear(ref y) if y == "2021"));
    }

    #[test]
    fn test_loaded_month_without_rows_gives_zero_summary() {
        let empty: Vec<StatementRow> = Vec::new();
        let summary = YearAggregator::aggregate_tables("2021", [("01", &empty[..])]).unwrap();
        assert_eq!(summary.year_total, 0.0);
        assert!(summary.by_counterparty.is_empty());
    }

    #[test]
    fn test_counterparties_by_total_largest_outflow_first() {
        let jan = january();
        let summary = YearAggregator::aggregate_tables("2021", [("01", &jan[..])]).unwrap();
        let ordered: Vec<&str> = summary
            .counterparties_by_total()
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(ordered, vec!["Stadtwerke", "Bäckerei", "Arbeitgeber AG"]);
    }

    // ── aggregate over a store ────────────────────────────────────────────────

    fn write_statement(dir: &Path, name: &str, rows: &[&str]) -> std::path::PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "Buchungstag;Wertstellung;Buchungstext;Auftraggeber / Begünstigter;Verwendungszweck;Betrag (EUR)"
        )
        .unwrap();
        for r in rows {
            writeln!(file, "{}", r).unwrap();
        }
        path
    }

    #[test]
    fn test_aggregate_store_skips_unloaded_months() {
        let dir = TempDir::new().unwrap();
        let jan = write_statement(
            dir.path(),
            "2021_01.csv",
            &["04.01.2021;04.01.2021;Lastschrift;Stadtwerke;Strom;-54,30"],
        );
        let feb = write_statement(
            dir.path(),
            "2021_02.csv",
            &["04.02.2021;04.02.2021;Lastschrift;Stadtwerke;Strom;kaputt"],
        );

        let mut store = MonthlyBatchStore::default();
        store.register("2021", "01", &jan);
        store.register("2021", "02", &feb);
        store.load("2021", "01").unwrap();
        assert!(store.load("2021", "02").is_err());

        let summary = YearAggregator::aggregate(&store, "2021").unwrap();
        assert_eq!(summary.months, vec!["01"]);
        assert!(approx(summary.year_total, -54.30));
    }

    #[test]
    fn test_aggregate_year_without_loaded_months() {
        let mut store = MonthlyBatchStore::default();
        store.register("2020", "12", "missing.csv");

        let err = YearAggregator::aggregate(&store, "2020").unwrap_err();
        assert!(matches!(err, StatementError::EmptyYear(_)));
    }

    #[test]
    fn test_aggregate_all_isolates_years() {
        let dir = TempDir::new().unwrap();
        let ok = write_statement(
            dir.path(),
            "2021_01.csv",
            &["04.01.2021;04.01.2021;Gutschrift;Oma;Geburtstag;50,00"],
        );

        let mut store = MonthlyBatchStore::default();
        store.register("2020", "12", dir.path().join("2020_12.csv"));
        store.register("2021", "01", &ok);
        store.load("2021", "01").unwrap();

        let results = YearAggregator::aggregate_all(&store);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].0, "2020");
        assert!(results[0].1.is_err());
        assert_eq!(results[1].0, "2021");
        assert!(approx(results[1].1.as_ref().unwrap().year_total, 50.0));
    }
}
