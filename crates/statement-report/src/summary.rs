//! Plain-text rendering of yearly summaries for the terminal.

use std::fmt::Write as _;

use statement_core::formatting::{display_width, format_currency, pad_left, pad_right};
use statement_data::aggregator::YearSummary;
use statement_data::analysis::ReportFailure;

const AMOUNT_WIDTH: usize = 16;

/// Render one year's totals, the per-counterparty table and the per-category
/// table. Group tables list the largest outflow first.
pub fn render_summary(summary: &YearSummary) -> String {
    let mut out = String::new();

    let _ = writeln!(
        out,
        "══ {} ══ {} transactions from {} month(s): {}",
        summary.year,
        summary.transaction_count(),
        summary.months.len(),
        summary.months.join(", ")
    );
    let totals = [
        ("Income", summary.income),
        ("Expenses", summary.expenses),
        ("Total", summary.year_total),
    ];
    for (label, amount) in totals {
        let _ = writeln!(
            out,
            "{}{}",
            pad_right(label, 10),
            pad_left(&format_currency(amount), AMOUNT_WIDTH)
        );
    }

    render_table(&mut out, "By counterparty", &summary.counterparties_by_total());
    render_table(&mut out, "By category", &summary.categories_by_total());
    out
}

/// One line per file or year that dropped out of the report.
pub fn render_failures(failures: &[ReportFailure]) -> String {
    let mut out = String::new();
    if failures.is_empty() {
        return out;
    }

    let _ = writeln!(out, "{} problem(s):", failures.len());
    for failure in failures {
        let _ = writeln!(
            out,
            "  [{}] {}: {}",
            failure.stage, failure.label, failure.error
        );
    }
    out
}

fn render_table(out: &mut String, title: &str, rows: &[(&str, f64)]) {
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", title);

    let name_width = rows
        .iter()
        .map(|(name, _)| display_width(name))
        .max()
        .unwrap_or(0)
        .max(8);

    for (name, amount) in rows {
        let label = if name.is_empty() { "(leer)" } else { name };
        let _ = writeln!(
            out,
            "  {}{}",
            pad_right(label, name_width),
            pad_left(&format_currency(*amount), AMOUNT_WIDTH)
        );
    }
}
