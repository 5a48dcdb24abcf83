//! Timestamp helpers shared by the cache and save sync.
//!
//! The server stores times at second precision while local filesystems keep
//! nanoseconds, so every local-vs-remote comparison goes through
//! [`cmp_seconds`].

use std::cmp::Ordering;
use std::time::SystemTime;

use chrono::{DateTime, SubsecRound, Utc};

pub fn truncate_to_seconds(t: DateTime<Utc>) -> DateTime<Utc> {
    t.trunc_subsecs(0)
}

/// Compare two instants after dropping sub-second precision.
pub fn cmp_seconds(a: DateTime<Utc>, b: DateTime<Utc>) -> Ordering {
    a.timestamp().cmp(&b.timestamp())
}

pub fn from_system_time(t: SystemTime) -> DateTime<Utc> {
    DateTime::<Utc>::from(t)
}

pub fn to_system_time(t: DateTime<Utc>) -> SystemTime {
    SystemTime::from(t)
}

/// `YYYY-MM-DD HH-MM-SS-000`, the suffix used for uploaded save names.
/// The millisecond field is always literal `000`.
pub fn upload_stamp(t: DateTime<Utc>) -> String {
    format!("{}-000", t.format("%Y-%m-%d %H-%M-%S"))
}

/// `YYYY-MM-DD HH-MM-SS`, the suffix used for backup copies.
pub fn backup_stamp(t: DateTime<Utc>) -> String {
    t.format("%Y-%m-%d %H-%M-%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn sub_second_difference_compares_equal() {
        let local = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
            + chrono::Duration::nanoseconds(123_456_789);
        let remote = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        assert_eq!(cmp_seconds(local, remote), Ordering::Equal);
        assert_eq!(truncate_to_seconds(local), remote);
    }

    #[test]
    fn whole_second_difference_is_ordered() {
        let a = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let b = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 1).unwrap();
        assert_eq!(cmp_seconds(a, b), Ordering::Less);
        assert_eq!(cmp_seconds(b, a), Ordering::Greater);
    }

    #[test]
    fn stamps_use_dashes_and_literal_millis() {
        let t = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(upload_stamp(t), "2024-01-02 03-04-05-000");
        assert_eq!(backup_stamp(t), "2024-01-02 03-04-05");
    }

    #[test]
    fn system_time_round_trip() {
        let t = Utc.with_ymd_and_hms(2015, 10, 21, 7, 28, 0).unwrap();
        assert_eq!(from_system_time(to_system_time(t)), t);
    }
}
