//! Field readers shared by the adapters
//!
//! Engines report numbers as JSON numbers, numeric strings, or text with
//! thousands separators. These helpers read them leniently.

use serde_json::{Number, Value};

/// Reads a number from a JSON number or a numeric string.
///
/// Strings may carry a leading `~` and `,` separators (`"~1,234"`).
pub fn parse_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_numeric_text(s),
        _ => None,
    }
}

/// Parses numeric text such as `"120.5"`, `"1,234"` or `"~42"`
pub fn parse_numeric_text(text: &str) -> Option<f64> {
    let cleaned: String = text
        .trim()
        .trim_start_matches('~')
        .chars()
        .filter(|c| *c != ',')
        .collect();
    cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// JSON number for `n`, integral when `n` has no fractional part
pub fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && n >= 0.0 && n <= u64::MAX as f64 {
        Value::Number(Number::from(n as u64))
    } else {
        Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
    }
}

/// Cost derived from a cardinality estimate: `log10(max(n, 1)) * 1000`
pub fn cost_from_cardinality(cardinality: f64) -> f64 {
    cardinality.max(1.0).log10() * 1000.0
}

/// Renders a field as text: strings verbatim, arrays one element per line,
/// anything else as JSON.
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(value_to_text)
            .collect::<Vec<_>>()
            .join("\n"),
        other => other.to_string(),
    }
}
