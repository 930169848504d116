//! terminal-stocks.dev text table
//!
//! The service answers `GET /{symbol}` with a box-drawn table meant for a
//! terminal. Line 4 holds the quote row, split into cells by `│`, and
//! line 6 carries the update time as "Month D, YYYY, HH:MM:SS". Only the
//! day part is kept as the trading day.

use heapless::String;
use stockpaper_core::traits::{FetchError, Quote};

use super::body_text;

/// Row holding the quote cells
const QUOTE_LINE: usize = 4;

/// Row holding the update time
const DATE_LINE: usize = 6;

/// Cell separator
const CELL_SEPARATOR: char = '│';

/// Parse a quote from the table output
pub fn parse_quote(body: &[u8]) -> Result<Quote, FetchError> {
    let text = body_text(body);
    let mut lines = text.lines();

    let row = lines.nth(QUOTE_LINE).ok_or(FetchError::Parse)?;
    let date_line = lines.nth(DATE_LINE - QUOTE_LINE - 1).unwrap_or("");

    let mut cells = row.split(CELL_SEPARATOR).skip(2);
    let price_cell = cells.next().ok_or(FetchError::Parse)?;
    let change_cell = cells.next().ok_or(FetchError::Parse)?;
    let percent_cell = cells.next().ok_or(FetchError::Parse)?;

    let price = find_decimal(price_cell, Pattern::UNSIGNED).ok_or(FetchError::Parse)?;
    let change = find_decimal(change_cell, Pattern::CURRENCY).ok_or(FetchError::Parse)?;
    let change_percent = find_decimal(percent_cell, Pattern::SIGNED).ok_or(FetchError::Parse)?;

    let as_of = find_date(date_line).and_then(|date| {
        let mut text = String::new();
        text.push_str(date).ok().map(|_| text)
    });

    Ok(Quote {
        price,
        change,
        change_percent,
        as_of,
    })
}

/// Shape of a decimal number to look for
#[derive(Debug, Clone, Copy)]
struct Pattern {
    /// Accept a leading `-`
    signed: bool,
    /// Require a `$` between sign and digits
    currency: bool,
}

impl Pattern {
    const UNSIGNED: Self = Self {
        signed: false,
        currency: false,
    };
    const SIGNED: Self = Self {
        signed: true,
        currency: false,
    };
    const CURRENCY: Self = Self {
        signed: true,
        currency: true,
    };
}

/// First `digits.digits` in `text` matching `pattern`
///
/// Terminal color escapes in the cells never contain a `.` after digits,
/// so they are skipped naturally.
fn find_decimal(text: &str, pattern: Pattern) -> Option<f32> {
    let bytes = text.as_bytes();
    (0..bytes.len()).find_map(|start| match_decimal(&bytes[start..], pattern))
}

fn match_decimal(bytes: &[u8], pattern: Pattern) -> Option<f32> {
    let mut i = 0;

    let negative = pattern.signed && bytes.first() == Some(&b'-');
    if negative {
        i += 1;
    }
    if pattern.currency {
        if bytes.get(i) != Some(&b'$') {
            return None;
        }
        i += 1;
    }

    let start = i;
    let int_digits = count_digits(&bytes[i..]);
    if int_digits == 0 || bytes.get(i + int_digits) != Some(&b'.') {
        return None;
    }
    i += int_digits + 1;

    let frac_digits = count_digits(&bytes[i..]);
    if frac_digits == 0 {
        return None;
    }
    i += frac_digits;

    let digits = core::str::from_utf8(&bytes[start..i]).ok()?;
    let value: f32 = digits.parse().ok()?;
    Some(if negative { -value } else { value })
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

/// "Month D, YYYY" of the first "Month D, YYYY, HH:MM:SS" in `text`
fn find_date(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();
    (0..bytes.len()).find_map(|start| match_date(&bytes[start..]).map(|len| &text[start..start + len]))
}

/// Length of the day part of a timestamp starting at `bytes[0]`, if one does
fn match_date(bytes: &[u8]) -> Option<usize> {
    if !bytes.first()?.is_ascii_uppercase() {
        return None;
    }
    let mut i = 1;

    let lower = bytes[i..].iter().take_while(|b| b.is_ascii_lowercase()).count();
    if lower == 0 {
        return None;
    }
    i += lower;

    // " D, YYYY, HH:MM:SS"
    i = expect(bytes, i, b" ")?;
    i = digits(bytes, i)?;
    i = expect(bytes, i, b", ")?;
    let day_end = digits(bytes, i)?;
    i = expect(bytes, day_end, b", ")?;
    i = digits(bytes, i)?;
    i = expect(bytes, i, b":")?;
    i = digits(bytes, i)?;
    i = expect(bytes, i, b":")?;
    digits(bytes, i)?;
    Some(day_end)
}

fn expect(bytes: &[u8], at: usize, literal: &[u8]) -> Option<usize> {
    bytes
        .get(at..at + literal.len())
        .filter(|s| *s == literal)
        .map(|_| at + literal.len())
}

fn digits(bytes: &[u8], at: usize) -> Option<usize> {
    let n = count_digits(bytes.get(at..)?);
    (n > 0).then_some(at + n)
}

/// Table as served for ARM on a falling day
#[cfg(test)]
pub(crate) const SAMPLE: &str = "\n\
┌────────┬────────────┬────────────┬────────────┐\n\
│ Symbol │ Price      │ Change     │ Change %   │\n\
├────────┼────────────┼────────────┼────────────┤\n\
│ ARM    │ $189.50    │ -$2.30     │ -1.20%     │\n\
└────────┴────────────┴────────────┴────────────┘\n\
Last updated: January 15, 2024, 14:30:00 UTC\n";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_table() {
        let quote = parse_quote(SAMPLE.as_bytes()).unwrap();
        assert_eq!(quote.price, 189.5);
        assert_eq!(quote.change, -2.3);
        assert_eq!(quote.change_percent, -1.2);
        assert_eq!(quote.as_of.unwrap().as_str(), "January 15, 2024");
    }

    #[test]
    fn test_parse_colored_cells() {
        let table = SAMPLE
            .replace("$189.50", "\u{1b}[1;32m$189.50\u{1b}[0m")
            .replace("-$2.30", "\u{1b}[31m+$2.30\u{1b}[0m")
            .replace("-1.20%", "\u{1b}[31m1.20%\u{1b}[0m");
        let quote = parse_quote(table.as_bytes()).unwrap();
        assert_eq!(quote.price, 189.5);
        assert_eq!(quote.change, 2.3);
        assert_eq!(quote.change_percent, 1.2);
    }

    #[test]
    fn test_missing_date_still_parses() {
        let table = SAMPLE.replace("January 15, 2024, 14:30:00", "soon");
        let quote = parse_quote(table.as_bytes()).unwrap();
        assert!(quote.as_of.is_none());
    }

    #[test]
    fn test_date_without_time_is_ignored() {
        let table = SAMPLE.replace("January 15, 2024, 14:30:00", "January 15, 2024");
        let quote = parse_quote(table.as_bytes()).unwrap();
        assert!(quote.as_of.is_none());
    }

    #[test]
    fn test_short_body_is_parse_error() {
        assert_eq!(parse_quote(b"Not found\n"), Err(FetchError::Parse));
    }

    #[test]
    fn test_non_numeric_cell_is_parse_error() {
        let table = SAMPLE.replace("$189.50", "n/a");
        assert_eq!(parse_quote(table.as_bytes()), Err(FetchError::Parse));
    }

    #[test]
    fn test_find_decimal_patterns() {
        assert_eq!(find_decimal("price -12.50", Pattern::UNSIGNED), Some(12.5));
        assert_eq!(find_decimal("x -0.75%", Pattern::SIGNED), Some(-0.75));
        assert_eq!(find_decimal("2.00 -$3.10", Pattern::CURRENCY), Some(-3.1));
        assert_eq!(find_decimal("12 .5", Pattern::SIGNED), None);
    }
}
