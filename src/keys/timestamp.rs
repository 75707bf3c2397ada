//! Timestamp codec for storage key stamps.
//!
//! A stamp is the Unix epoch second count rendered in decimal. The encoding is
//! deterministic so that an upload-authorization step and a later confirmation
//! step derive the same key without re-coordination.

use chrono::{DateTime, TimeZone, Utc};

/// Encode a point in time as a stamp token
pub fn to_stamp(at: DateTime<Utc>) -> String {
    at.timestamp().to_string()
}

/// Decode a stamp token back to a point in time.
///
/// Returns `None` if the token is not a valid stamp.
pub fn to_datetime(stamp: &str) -> Option<DateTime<Utc>> {
    let seconds: i64 = stamp.parse().ok()?;
    Utc.timestamp_opt(seconds, 0).single()
}

/// Stamp for the active (confirmed) version of an upload, if any
pub fn active_stamp(uploaded_on: Option<DateTime<Utc>>) -> Option<String> {
    uploaded_on.map(to_stamp)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stamp_is_epoch_seconds() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(to_stamp(at), "1704067200");
    }

    #[test]
    fn test_stamp_deterministic() {
        let at = Utc.with_ymd_and_hms(2023, 6, 15, 12, 30, 45).unwrap();
        assert_eq!(to_stamp(at), to_stamp(at));
    }

    #[test]
    fn test_roundtrip() {
        let at = Utc.with_ymd_and_hms(2023, 6, 15, 12, 30, 45).unwrap();
        assert_eq!(to_datetime(&to_stamp(at)), Some(at));
    }

    #[test]
    fn test_invalid_stamp() {
        assert_eq!(to_datetime("not-a-stamp"), None);
        assert_eq!(to_datetime(""), None);
    }

    #[test]
    fn test_active_stamp() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(active_stamp(Some(at)), Some("1704067200".to_string()));
        assert_eq!(active_stamp(None), None);
    }
}
