//! Time and timestamp helpers.

use chrono::{DateTime, TimeDelta, Utc};

/// UTC timestamp used for suspension windows, offline records, etc.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Return the timestamp `minutes` after `from`.
#[must_use]
pub fn minutes_after(from: Timestamp, minutes: u32) -> Timestamp {
    from + TimeDelta::minutes(i64::from(minutes))
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
    fn should_add_minutes_to_timestamp() {
        let start = now();
        let end = minutes_after(start, 90);
        assert_eq!((end - start).num_minutes(), 90);
    }

    #[test]
    fn should_return_same_instant_for_zero_minutes() {
        let start = now();
        assert_eq!(minutes_after(start, 0), start);
    }
}
