//! Forgiving deserializers for numeric fields the service sends as either
//! JSON numbers or formatted strings.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer};

use crate::format::parse_amount;

/// Either shape a numeric field may take on the wire.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawNumber {
    /// Plain JSON number.
    Number(f64),
    /// Number formatted as text, possibly with currency symbols.
    Text(String),
}

/// Deserializes a signed number. Strings go through [`parse_amount`];
/// `null` or garbage becomes `0.0`.
pub(crate) fn number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<RawNumber>::deserialize(deserializer).map(finite)
}

/// Converts either wire shape to a finite number, `0.0` for anything else.
fn finite(raw: Option<RawNumber>) -> f64 {
    let value = match raw {
        Some(RawNumber::Number(value)) => value,
        Some(RawNumber::Text(text)) => parse_amount(&text).unwrap_or(0.0),
        None => 0.0,
    };
    if value.is_finite() { value } else { 0.0 }
}

/// Deserializes a magnitude: like [`number`] but always non-negative.
pub(crate) fn amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    number(deserializer).map(f64::abs)
}

/// Deserializes a name-to-total map whose values follow [`number`].
/// `null` becomes an empty map.
pub(crate) fn number_map<'de, D>(deserializer: D) -> Result<HashMap<String, f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<HashMap<String, Option<RawNumber>>>::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|(name, value)| (name, finite(value)))
        .collect())
}
