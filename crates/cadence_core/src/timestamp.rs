//! Zero-padded UTC timestamps for last-write-wins ordering.
//!
//! Last-write-wins comparisons in the merge engine are plain string
//! comparisons. That is only a valid time order when both operands are
//! zero-padded UTC ISO-8601, so the accepted shapes are validated here
//! rather than assumed:
//!
//! - `2024-01-02T03:04:05Z` (seconds precision, produced by [`now_utc`])
//! - `2024-01-02T03:04:05.123Z` (millisecond precision, as emitted by
//!   JavaScript `Date.toISOString()` in older clients)
//!
//! Anything else (non-UTC offsets, space separators, unpadded fields) is
//! rejected and loses every comparison, which keeps a malformed remote
//! timestamp from silently clobbering local state.

use crate::error::{CoreError, CoreResult};
use chrono::{NaiveDate, Utc};

/// Returns the current time as a zero-padded UTC ISO-8601 string.
#[must_use]
pub fn now_utc() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Returns true if `value` is in one of the accepted zero-padded UTC forms.
#[must_use]
pub fn is_lww_comparable(value: &str) -> bool {
    let bytes = value.as_bytes();
    let (date_time, fraction) = match bytes.len() {
        20 => (&bytes[..19], &bytes[..0]),
        24 => {
            if bytes[19] != b'.' {
                return false;
            }
            (&bytes[..19], &bytes[20..23])
        }
        _ => return false,
    };
    if bytes[bytes.len() - 1] != b'Z' {
        return false;
    }
    if !fraction.iter().all(u8::is_ascii_digit) {
        return false;
    }
    if date_time[4] != b'-'
        || date_time[7] != b'-'
        || date_time[10] != b'T'
        || date_time[13] != b':'
        || date_time[16] != b':'
    {
        return false;
    }
    let digits = [0, 1, 2, 3, 5, 6, 8, 9, 11, 12, 14, 15, 17, 18];
    if !digits.iter().all(|&i| date_time[i].is_ascii_digit()) {
        return false;
    }
    // Field structure is right; make sure it is also a real calendar time.
    let field = |from: usize, to: usize| -> u32 {
        value[from..to].parse().unwrap_or(u32::MAX)
    };
    let valid_date = NaiveDate::from_ymd_opt(
        value[0..4].parse().unwrap_or(i32::MAX),
        field(5, 7),
        field(8, 10),
    )
    .is_some();
    valid_date && field(11, 13) < 24 && field(14, 16) < 60 && field(17, 19) < 60
}

/// Validates that `value` can participate in last-write-wins ordering.
///
/// # Errors
///
/// Returns [`CoreError::InvalidTimestamp`] when the value is not in an
/// accepted zero-padded UTC form.
pub fn ensure_comparable(value: &str) -> CoreResult<&str> {
    if is_lww_comparable(value) {
        Ok(value)
    } else {
        Err(CoreError::InvalidTimestamp {
            value: value.to_string(),
        })
    }
}

/// Returns true if `remote` should win a last-write-wins comparison
/// against `local`.
///
/// The remote side wins only when its timestamp is non-empty, validated,
/// and lexically greater. Ties, empty values, and malformed remote
/// timestamps all keep local.
#[must_use]
pub fn lww_newer(remote: &str, local: &str) -> bool {
    if remote.is_empty() || !is_lww_comparable(remote) {
        return false;
    }
    remote > local
}

/// Returns the later of two timestamps under lexical ordering.
///
/// Used to stamp merged snapshots so a merge result is never older than
/// either input.
#[must_use]
pub fn later<'a>(a: &'a str, b: &'a str) -> &'a str {
    if b > a {
        b
    } else {
        a
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn now_utc_is_comparable() {
        let now = now_utc();
        assert!(is_lww_comparable(&now));
        assert_eq!(now.len(), 20);
    }

    #[test]
    fn accepts_both_precisions() {
        assert!(is_lww_comparable("2024-01-02T03:04:05Z"));
        assert!(is_lww_comparable("2024-01-02T03:04:05.123Z"));
    }

    #[test]
    fn rejects_malformed_shapes() {
        assert!(!is_lww_comparable(""));
        assert!(!is_lww_comparable("2024-1-02T03:04:05Z"));
        assert!(!is_lww_comparable("2024-01-02 03:04:05"));
        assert!(!is_lww_comparable("2024-01-02T03:04:05+02:00"));
        assert!(!is_lww_comparable("2024-01-02T03:04:05"));
        assert!(!is_lww_comparable("2024-01-02T03:04:05.12Z"));
        assert!(!is_lww_comparable("not a timestamp at all!"));
    }

    #[test]
    fn rejects_impossible_calendar_times() {
        assert!(!is_lww_comparable("2024-13-02T03:04:05Z"));
        assert!(!is_lww_comparable("2024-02-30T03:04:05Z"));
        assert!(!is_lww_comparable("2024-01-02T25:04:05Z"));
        assert!(!is_lww_comparable("2024-01-02T03:61:05Z"));
    }

    #[test]
    fn lww_remote_wins_only_when_newer() {
        assert!(lww_newer("2024-01-02T00:00:00Z", "2024-01-01T00:00:00Z"));
        assert!(!lww_newer("2024-01-01T00:00:00Z", "2024-01-02T00:00:00Z"));
        // Tie keeps local.
        assert!(!lww_newer("2024-01-01T00:00:00Z", "2024-01-01T00:00:00Z"));
        // Empty local always loses to a valid remote.
        assert!(lww_newer("2024-01-01T00:00:00Z", ""));
    }

    #[test]
    fn lww_malformed_remote_never_wins() {
        assert!(!lww_newer("", "2024-01-01T00:00:00Z"));
        assert!(!lww_newer("", ""));
        // A space-separated server timestamp would sort before "T" forms and
        // must not participate at all.
        assert!(!lww_newer("2099-01-01 00:00:00", "2024-01-01T00:00:00Z"));
    }

    #[test]
    fn ensure_comparable_round_trips() {
        assert!(ensure_comparable("2024-01-02T03:04:05Z").is_ok());
        let err = ensure_comparable("yesterday").unwrap_err();
        assert!(err.to_string().contains("yesterday"));
    }

    #[test]
    fn later_picks_lexical_max() {
        assert_eq!(
            later("2024-01-01T00:00:00Z", "2024-01-02T00:00:00Z"),
            "2024-01-02T00:00:00Z"
        );
        assert_eq!(
            later("2024-01-02T00:00:00Z", "2024-01-01T00:00:00Z"),
            "2024-01-02T00:00:00Z"
        );
        assert_eq!(later("", ""), "");
    }
}
