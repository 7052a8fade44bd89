use std::borrow::Cow;
use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;
use tracing::debug;

use crate::error::{Result, StatementError};

// ── AmountProcessor ───────────────────────────────────────────────────────────

/// Coerces German-locale amount strings (`1.234,56`) into numbers.
pub struct AmountProcessor;

impl AmountProcessor {
    /// Drop every `.` thousands separator, then read `,` as the decimal point.
    ///
    /// Returns `None` for empty cells and anything that is not a finite number
    /// after the transform.
    pub fn parse(raw: &str) -> Option<f64> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }

        let normalised = trimmed.replace('.', "").replace(',', ".");
        let value: f64 = normalised.parse().ok()?;
        value.is_finite().then_some(value)
    }
}

// ── DateProcessor ─────────────────────────────────────────────────────────────

/// Parses value dates from the formats seen in statement exports.
pub struct DateProcessor;

impl DateProcessor {
    // `%y` must precede `%Y`: chrono reads "21" under `%Y` as year 21.
    const FORMATS: &'static [&'static str] = &[
        "%d.%m.%y",
        "%d.%m.%Y",
        "%Y-%m-%d",
        "%d/%m/%Y",
        "%Y/%m/%d",
        "%d-%m-%Y",
    ];

    /// Try each known format in turn; the first match wins.
    pub fn parse(raw: &str) -> Result<NaiveDate> {
        let s = raw.trim();
        for fmt in Self::FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
                return Ok(date);
            }
        }

        debug!("DateProcessor: no format matched \"{}\"", s);
        Err(StatementError::DateParse(s.to_string()))
    }
}

// ── EncodingRepair ────────────────────────────────────────────────────────────

/// Replaces the U+FFFD left behind where a Latin-1 `Ü`/`ü` was decoded as
/// UTF-8.
///
/// A replacement character opening the cell stands for a capital umlaut and
/// becomes `Ue`; any other occurrence becomes `ue`.
pub struct EncodingRepair;

impl EncodingRepair {
    pub fn repair(cell: &str) -> Cow<'_, str> {
        if !cell.contains('\u{FFFD}') {
            return Cow::Borrowed(cell);
        }

        let leading = leading_re().replace(cell, "Ue");
        Cow::Owned(inner_re().replace_all(&leading, "ue").into_owned())
    }
}

fn leading_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new("^\u{FFFD}").expect("regex is valid"))
}

fn inner_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new("\u{FFFD}").expect("regex is valid"))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
