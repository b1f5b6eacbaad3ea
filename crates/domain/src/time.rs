//! Time and timestamp helpers.

use chrono::{DateTime, Utc};

/// UTC timestamp used for message times, last-question times and history rows.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Convert a unix timestamp (seconds) into a [`Timestamp`], if representable.
#[must_use]
pub fn from_unix(seconds: i64) -> Option<Timestamp> {
    DateTime::from_timestamp(seconds, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_return_current_utc_time() {
        let before = Utc::now();
        let ts = now();
        let after = Utc::now();
        assert!(ts >= before);
        assert!(ts <= after);
    }

    #[test]
    fn should_convert_unix_seconds() {
        let ts = from_unix(1_700_000_000).unwrap();
        assert_eq!(ts.timestamp(), 1_700_000_000);
    }
}
