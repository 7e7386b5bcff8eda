//! Blog domain model.
//!
//! # Responsibility
//! - Define the records persisted by the content store.
//! - Own field-level validation run before every write.
//!
//! # Invariants
//! - Persisted records carry a store-assigned integer id.
//! - Timestamps are UTC and stored with millisecond precision.

pub mod comment;
pub mod post;
pub mod tag;
pub mod user;
pub mod validation;

use chrono::{DateTime, SubsecRound, TimeZone, Utc};

/// Converts a timestamp to the epoch-millisecond form used by storage.
pub fn to_epoch_ms(value: DateTime<Utc>) -> i64 {
    value.timestamp_millis()
}

/// Drops sub-millisecond precision, matching what storage keeps.
pub fn to_storage_precision(value: DateTime<Utc>) -> DateTime<Utc> {
    value.trunc_subsecs(3)
}

/// Converts stored epoch milliseconds back to a UTC timestamp.
///
/// Returns `None` when the value is outside chrono's representable range.
pub fn from_epoch_ms(value: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(value).single()
}

#[cfg(test)]
mod tests {
    use super::{from_epoch_ms, to_epoch_ms, to_storage_precision};
    use chrono::{TimeZone, Utc};

    #[test]
    fn epoch_ms_conversion_keeps_millisecond_precision() {
        let value = Utc.timestamp_millis_opt(1_682_942_400_123).unwrap();
        assert_eq!(from_epoch_ms(to_epoch_ms(value)), Some(value));
        assert_eq!(from_epoch_ms(i64::MAX), None);
    }

    #[test]
    fn storage_precision_matches_stored_value() {
        let precise = Utc.timestamp_nanos(1_682_942_400_123_456_789);
        let truncated = to_storage_precision(precise);
        assert_eq!(from_epoch_ms(to_epoch_ms(precise)), Some(truncated));

        let before_epoch = Utc.timestamp_nanos(-1_500_001);
        assert_eq!(
            from_epoch_ms(to_epoch_ms(before_epoch)),
            Some(to_storage_precision(before_epoch))
        );
    }
}
