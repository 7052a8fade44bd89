use unicode_width::UnicodeWidthStr;

/// Format a floating-point number German-style: `.` groups thousands and `,`
/// separates the decimals.
///
/// # Examples
///
/// ```
/// use statement_core::formatting::format_number;
///
/// assert_eq!(format_number(1234.5, 1), "1.234,5");
/// assert_eq!(format_number(1234567.0, 0), "1.234.567");
/// assert_eq!(format_number(0.0, 2), "0,00");
/// assert_eq!(format_number(-9876.5, 1), "-9.876,5");
/// ```
pub fn format_number(value: f64, decimals: u32) -> String {
    let negative = value < 0.0;
    let abs_value = value.abs();

    // Nudge by half an ULP at the target precision so exact midpoints round up.
    let factor = 10_f64.powi(decimals as i32);
    let epsilon = f64::EPSILON * abs_value * factor;
    let rounded = ((abs_value * factor) + epsilon).round() / factor;

    let integer_part = rounded.trunc() as u64;
    let frac_part = rounded - rounded.trunc();

    let grouped = group_thousands(&integer_part.to_string());

    let result = if decimals == 0 {
        grouped
    } else {
        // "0.50" -> ",50"
        let frac_str = format!("{:.prec$}", frac_part, prec = decimals as usize);
        format!("{},{}", grouped, &frac_str[2..])
    };

    // Never print "-0,00".
    if negative && rounded > 0.0 {
        format!("-{}", result)
    } else {
        result
    }
}

/// Format an amount in EUR with two decimals, e.g. `-1.234,56 €`.
///
/// ```
/// use statement_core::formatting::format_currency;
///
/// assert_eq!(format_currency(1234.56), "1.234,56 €");
/// assert_eq!(format_currency(-9.99), "-9,99 €");
/// ```
pub fn format_currency(amount: f64) -> String {
    format!("{} €", format_number(amount, 2))
}

/// Left-align `text` in a column `width` terminal cells wide.
///
/// Counterparty names carry umlauts and other multi-byte characters, so the
/// padding is computed from display width rather than byte length. Text
/// wider than the column is returned unchanged.
pub fn pad_right(text: &str, width: usize) -> String {
    let current = UnicodeWidthStr::width(text);
    if current >= width {
        return text.to_string();
    }
    format!("{}{}", text, " ".repeat(width - current))
}

/// Right-align `text` in a column `width` terminal cells wide.
pub fn pad_left(text: &str, width: usize) -> String {
    let current = UnicodeWidthStr::width(text);
    if current >= width {
        return text.to_string();
    }
    format!("{}{}", " ".repeat(width - current), text)
}

/// Display width of `text` in terminal cells.
pub fn display_width(text: &str) -> usize {
    UnicodeWidthStr::width(text)
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number_grouping() {
        assert_eq!(format_number(1_000.0, 0), "1.000");
        assert_eq!(format_number(999.0, 0), "999");
        assert_eq!(format_number(12_345_678.9, 2), "12.345.678,90");
    }

    #[test]
    fn test_format_number_rounding() {
        assert_eq!(format_number(0.125, 2), "0,13");
        assert_eq!(format_number(2.5, 0), "3");
    }

    #[test]
    fn test_format_number_negative_zero() {
        assert_eq!(format_number(-0.001, 2), "0,00");
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(0.0), "0,00 €");
        assert_eq!(format_currency(-1234.5), "-1.234,50 €");
    }

    #[test]
    fn test_pad_right_uses_display_width() {
        let padded = pad_right("Müller", 8);
        assert_eq!(padded, "Müller  ");
        assert_eq!(display_width(&padded), 8);
    }

    #[test]
    fn test_pad_left() {
        assert_eq!(pad_left("5,00 €", 8), "  5,00 €");
    }

    #[test]
    fn test_pad_overflow_unchanged() {
        assert_eq!(pad_right("Stadtwerke", 4), "Stadtwerke");
        assert_eq!(pad_left("Stadtwerke", 4), "Stadtwerke");
    }
}
