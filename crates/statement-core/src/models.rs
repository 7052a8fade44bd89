use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::data_processors::DateProcessor;
use crate::error::Result;

/// The fixed five-column schema every normalized statement table carries.
///
/// Variant order is the canonical column order used for export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CanonicalColumn {
    /// Value date of the booking (`Wertstellung`).
    ValueDate,
    /// Booking text, used as the transaction category (`Buchungstext`).
    Category,
    /// Payer or payee (`Auftraggeber / Begünstigter`).
    Counterparty,
    /// Free-text purpose line (`Verwendungszweck`).
    Purpose,
    /// Signed amount in EUR (`Betrag (EUR)`).
    Amount,
}

impl CanonicalColumn {
    pub const ALL: [CanonicalColumn; 5] = [
        CanonicalColumn::ValueDate,
        CanonicalColumn::Category,
        CanonicalColumn::Counterparty,
        CanonicalColumn::Purpose,
        CanonicalColumn::Amount,
    ];

    /// Header name used once the table is normalized.
    pub fn header(self) -> &'static str {
        match self {
            CanonicalColumn::ValueDate => "Wertstellung",
            CanonicalColumn::Category => "Buchungstext",
            CanonicalColumn::Counterparty => "Auftraggeber",
            CanonicalColumn::Purpose => "Verwendungszweck",
            CanonicalColumn::Amount => "Betrag",
        }
    }

    /// Header spellings accepted in a raw export, canonical name included.
    ///
    /// The counterparty header arrives mis-decoded in Latin-1 exports, so the
    /// U+FFFD form is listed next to the correctly decoded one.
    pub fn source_headers(self) -> &'static [&'static str] {
        match self {
            CanonicalColumn::ValueDate => &["Wertstellung"],
            CanonicalColumn::Category => &["Buchungstext"],
            CanonicalColumn::Counterparty => &[
                "Auftraggeber / Beg\u{FFFD}nstigter",
                "Auftraggeber / Begünstigter",
                "Auftraggeber",
            ],
            CanonicalColumn::Purpose => &["Verwendungszweck"],
            CanonicalColumn::Amount => &["Betrag (EUR)", "Betrag"],
        }
    }

    /// Map a raw header cell onto its canonical column, if it is kept.
    pub fn from_source_header(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|col| col.source_headers().contains(&name))
    }
}

/// Known booking texts found in the category column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BookingKind {
    Abschluss,
    Dauerauftrag,
    Gutschrift,
    Kartenabrechnung,
    Lastschrift,
    Gehalt,
    Ueberweisung,
}

impl BookingKind {
    /// Match a booking text, ignoring case and surrounding whitespace.
    ///
    /// Both the umlaut and the repaired `Ue` spelling of "Überweisung" match.
    pub fn from_category(category: &str) -> Option<Self> {
        let kind = match category.trim().to_lowercase().as_str() {
            "abschluss" => BookingKind::Abschluss,
            "dauerauftrag" => BookingKind::Dauerauftrag,
            "gutschrift" => BookingKind::Gutschrift,
            "kartenabrechnung" => BookingKind::Kartenabrechnung,
            "lastschrift" => BookingKind::Lastschrift,
            "gehalt" => BookingKind::Gehalt,
            "überweisung" | "ueberweisung" => BookingKind::Ueberweisung,
            _ => return None,
        };
        Some(kind)
    }
}

/// One row of a normalized statement table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementRow {
    /// Zero-based position of the row within its source file's data rows.
    pub index: usize,
    /// Value date exactly as exported; parsed lazily via [`Transaction`].
    pub value_date: String,
    pub category: String,
    pub counterparty: String,
    pub purpose: String,
    /// Amount after locale coercion.
    pub amount: f64,
}

/// Typed read-only projection of a [`StatementRow`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub amount: f64,
    pub category: String,
    pub value_date: NaiveDate,
    pub purpose: String,
    pub counterparty: String,
}

impl Transaction {
    /// Build a transaction from a normalized row, parsing its value date.
    pub fn from_row(row: &StatementRow) -> Result<Self> {
        Ok(Self {
            amount: row.amount,
            category: row.category.clone(),
            value_date: DateProcessor::parse(&row.value_date)?,
            purpose: row.purpose.clone(),
            counterparty: row.counterparty.clone(),
        })
    }

    /// The booking text as a [`BookingKind`], when it is a known one.
    pub fn booking_kind(&self) -> Option<BookingKind> {
        BookingKind::from_category(&self.category)
    }

    /// `true` for money leaving the account.
    pub fn is_expense(&self) -> bool {
        self.amount < 0.0
    }
}
