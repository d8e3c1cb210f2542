//! Display formatting for amounts, percentages and dates.
//!
//! All output follows the Brazilian conventions the app uses: `R$` prefix,
//! `.` as the thousands separator, `,` as the decimal separator, and
//! `DD/MM/YYYY` dates. Dates sent to the service use `YYYY-MM-DD`.

use chrono::{DateTime, NaiveDate};

/// Currency symbol prefixed to formatted amounts.
pub const CURRENCY_SYMBOL: &str = "R$";

/// Date layout used on the wire.
const API_DATE: &str = "%Y-%m-%d";

/// Date layout shown to the user.
const DISPLAY_DATE: &str = "%d/%m/%Y";

/// Formats an amount as Brazilian reais, e.g. `R$ 1.234,56`.
///
/// Negative amounts are prefixed with `-` (`-R$ 5,00`). Non-finite input
/// formats as zero. With `with_symbol = false` only the number is
/// returned (`1.234,56`).
#[must_use]
pub fn format_currency(amount: f64, with_symbol: bool) -> String {
    let value = if amount.is_finite() { amount } else { 0.0 };
    let cents = (value.abs() * 100.0).round();
    let whole = (cents / 100.0).trunc();
    let fraction = cents - whole * 100.0;
    let sign = if value < 0.0 && cents > 0.0 { "-" } else { "" };
    let number = format!("{},{fraction:02.0}", group_thousands(&format!("{whole:.0}")));
    if with_symbol {
        format!("{sign}{CURRENCY_SYMBOL} {number}")
    } else {
        format!("{sign}{number}")
    }
}

/// Formats large amounts compactly: `R$ 1.5K`, `R$ 2.3M`.
///
/// Amounts below one thousand fall back to [`format_currency`].
#[must_use]
pub fn format_compact_currency(amount: f64) -> String {
    let value = if amount.is_finite() { amount } else { 0.0 };
    let magnitude = value.abs();
    let sign = if value < 0.0 { "-" } else { "" };
    if magnitude >= 1_000_000.0 {
        format!("{sign}{CURRENCY_SYMBOL} {:.1}M", magnitude / 1_000_000.0)
    } else if magnitude >= 1_000.0 {
        format!("{sign}{CURRENCY_SYMBOL} {:.1}K", magnitude / 1_000.0)
    } else {
        format_currency(value, true)
    }
}

/// Formats a percentage rounded to a whole number, e.g. `85%`.
#[must_use]
pub fn format_percent(value: f64) -> String {
    let rounded = if value.is_finite() { value.round() } else { 0.0 };
    // `-0` would otherwise print with a sign.
    format!("{:.0}%", rounded + 0.0)
}

/// Formats a date as `DD/MM/YYYY`.
#[inline]
#[must_use]
pub fn format_date_for_display(date: NaiveDate) -> String {
    date.format(DISPLAY_DATE).to_string()
}

/// Formats a date as `YYYY-MM-DD`.
#[inline]
#[must_use]
pub fn format_date_for_api(date: NaiveDate) -> String {
    date.format(API_DATE).to_string()
}

/// Parses a date in any of the shapes the service and the user produce:
/// `YYYY-MM-DD`, an RFC 3339 timestamp, `DD/MM/YYYY`, or a timestamp
/// whose first ten characters are a `YYYY-MM-DD` date.
#[must_use]
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    NaiveDate::parse_from_str(trimmed, API_DATE)
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(trimmed)
                .ok()
                .map(|timestamp| timestamp.date_naive())
        })
        .or_else(|| NaiveDate::parse_from_str(trimmed, DISPLAY_DATE).ok())
        .or_else(|| {
            trimmed
                .get(..10)
                .and_then(|prefix| NaiveDate::parse_from_str(prefix, API_DATE).ok())
        })
}

/// Normalises a user- or service-provided date to `YYYY-MM-DD`.
///
/// Returns `None` when the input is not a recognizable date.
#[inline]
#[must_use]
pub fn normalize_date_for_api(raw: &str) -> Option<String> {
    parse_date(raw).map(format_date_for_api)
}

/// Parses an amount typed by the user or sent as text.
///
/// Currency symbols, spaces and other decoration are ignored. A comma is
/// accepted as the decimal separator; when both `.` and `,` appear, the
/// one that comes last is the decimal separator and the other groups
/// thousands. Returns `None` when no finite number remains.
#[must_use]
pub fn parse_amount(raw: &str) -> Option<f64> {
    let negative = raw.trim_start().starts_with('-');
    let kept: String = raw
        .chars()
        .filter(|ch| ch.is_ascii_digit() || matches!(ch, ',' | '.'))
        .collect();
    if !kept.chars().any(|ch| ch.is_ascii_digit()) {
        return None;
    }

    let last_comma = kept.rfind(',');
    let last_dot = kept.rfind('.');
    let normalized = match (last_comma, last_dot) {
        (Some(comma), Some(dot)) if comma > dot => kept.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => kept.replace(',', ""),
        (Some(_), None) if kept.matches(',').count() == 1 => kept.replace(',', "."),
        (Some(_), None) => kept.replace(',', ""),
        (None, Some(_)) if kept.matches('.').count() > 1 => kept.replace('.', ""),
        (None, Some(_) | None) => kept,
    };

    let magnitude: f64 = normalized.parse().ok()?;
    let value = if negative { -magnitude } else { magnitude };
    value.is_finite().then_some(value)
}

/// Inserts `.` between groups of three digits, from the right.
fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut grouped = String::with_capacity(len + len.div_euclid(3));
    for (position, digit) in digits.chars().enumerate() {
        if position > 0 && (len - position) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }
    grouped
}
