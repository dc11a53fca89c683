//! Forgiving deserializers for caller-supplied signal maps
//!
//! Signal maps arrive from form fields and hand-written JSON/YAML, so a
//! malformed value must degrade to "absent" (or qty 1) instead of failing
//! the whole document.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::quantity::parse_qty;

/// Quantity: integers, integral floats and numeric strings are accepted.
/// Any other present value coerces to 1.
pub fn qty<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Value::Null => None,
        Value::Number(n) => Some(
            n.as_u64()
                .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && *f >= 1.0).map(|f| f as u64))
                .and_then(|q| u32::try_from(q).ok())
                .filter(|q| *q > 0)
                .unwrap_or(1),
        ),
        Value::String(s) => Some(parse_qty(&s)),
        _ => Some(1),
    }))
}

/// Positive finite number, from a number or a numeric string
pub fn positive_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .and_then(|v| match v {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        })
        .filter(|f| f.is_finite() && *f > 0.0))
}

/// Trimmed non-empty string; numbers are accepted as their text form
pub fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }))
}
