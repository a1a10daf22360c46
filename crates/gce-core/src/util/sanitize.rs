//! Numeric sanitization for the API boundary (§4.9).
//!
//! Every numeric field that crosses into JSON is passed through this so a
//! degenerate upstream computation (divide-by-zero in a gradient color, an
//! empty cluster's centroid, a zero-magnitude embedding) can never surface
//! as `NaN` or `Infinity`, both of which are invalid JSON numbers.

/// Replace `NaN`/`±Infinity` with `default`; otherwise pass through.
pub fn sanitize_f64(value: f64, default: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        default
    }
}

/// Recursive sanitization over `serde_json::Value` trees, used as a final
/// defensive pass when assembling the API response.
///
/// `serde_json::Number` can never actually hold `NaN`/`Infinity` — encoding
/// one produces `Value::Null` instead — so the real sanitization has to
/// happen on the `f64` *before* it is turned into a `Value` (that's what
/// [`sanitize_f64`] is for, applied field-by-field while building the
/// response structs). This trait exists for the second line of defense: it
/// walks any tree and is a no-op on everything already well-formed, so
/// applying it to an already-sanitized response is always safe.
pub trait Sanitize {
    fn sanitize(&self) -> Self;
}

impl Sanitize for serde_json::Value {
    fn sanitize(&self) -> Self {
        use serde_json::Value;
        match self {
            Value::Array(items) => Value::Array(items.iter().map(Sanitize::sanitize).collect()),
            Value::Object(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.sanitize()))
                    .collect(),
            ),
            other => other.clone(),
        }
    }
}
