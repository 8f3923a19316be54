//! Loose value coercion for backend rows
//!
//! Rows arrive as JSON with whatever types the backend chose for a column
//! (numeric columns are sometimes strings, booleans are sometimes `0`/`1`).
//! These helpers turn a raw `serde_json::Value` into the typed field the
//! models expect, never failing: anything unusable becomes the zero value.

use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde_json::Value;

/// Coerce to `f64`. Non-numeric, non-finite and missing values become 0.
pub fn number(value: Option<&Value>) -> f64 {
    let n = match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => parse_number(s),
        _ => 0.0,
    };
    if n.is_finite() { n } else { 0.0 }
}

/// Coerce to `i64`, truncating any fractional part.
pub fn integer(value: Option<&Value>) -> i64 {
    match value {
        Some(Value::Number(n)) => match n.as_i64() {
            Some(i) => i,
            None => number(value).trunc() as i64,
        },
        _ => number(value).trunc() as i64,
    }
}

/// Coerce to `Decimal`. Strings are parsed exactly; floats go through `from_f64`.
pub fn decimal(value: Option<&Value>) -> Decimal {
    match value {
        Some(Value::String(s)) => {
            let s = s.trim();
            s.parse::<Decimal>()
                .ok()
                .or_else(|| Decimal::from_f64(parse_number(s)))
                .unwrap_or_default()
        }
        Some(Value::Number(n)) => n
            .as_i64()
            .map(Decimal::from)
            .or_else(|| n.as_f64().and_then(Decimal::from_f64))
            .unwrap_or_default(),
        _ => Decimal::ZERO,
    }
}

/// Truthiness: `null`, `false`, `0`, NaN and `""` are false, everything else true.
pub fn truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

/// Render as text. Numbers and booleans are formatted, `null`/missing is `""`.
pub fn text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(other @ (Value::Array(_) | Value::Object(_))) => other.to_string(),
        None | Some(Value::Null) => String::new(),
    }
}

/// Text, or `None` when missing, null or empty.
pub fn opt_text(value: Option<&Value>) -> Option<String> {
    let s = text(value);
    if s.is_empty() { None } else { Some(s) }
}

fn parse_number(s: &str) -> f64 {
    let s = s.trim();
    if s.is_empty() {
        return 0.0;
    }
    s.parse::<f64>().unwrap_or(0.0)
}
