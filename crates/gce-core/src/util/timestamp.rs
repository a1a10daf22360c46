//! Timestamp unit normalization (§3.2, §4.1).
//!
//! Raw timestamps arrive from the store in whatever unit the writer used.
//! Unit is inferred purely from magnitude: the wider the number, the finer
//! the unit. Negative values are rejected (never observed in a valid store;
//! treated as "no timestamp").

/// Magnitude above which a value is assumed to be microseconds.
const MICROSECOND_THRESHOLD: i64 = 1_000_000_000_000_000;
/// Magnitude above which a value is assumed to be milliseconds (and below
/// which, seconds).
const MILLISECOND_THRESHOLD: i64 = 1_000_000_000_000;

/// Normalize a raw timestamp of unknown unit into milliseconds since epoch.
///
/// Returns `None` for negative input — there is no valid "before epoch"
/// reading in this store's domain, so a negative value means "absent."
pub fn normalize_timestamp_ms(raw: i64) -> Option<i64> {
    if raw < 0 {
        return None;
    }
    if raw > MICROSECOND_THRESHOLD {
        Some(raw / 1000)
    } else if raw > MILLISECOND_THRESHOLD {
        Some(raw)
    } else {
        Some(raw * 1000)
    }
}
