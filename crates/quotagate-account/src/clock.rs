//! Quota period boundaries.
//!
//! A quota period is one calendar day in [`QUOTA_ZONE`]. The zone is fixed
//! for the whole service; it is never taken from the request.

use time::{OffsetDateTime, UtcOffset};

/// Reference zone for calendar-day quota periods.
pub const QUOTA_ZONE: UtcOffset = UtcOffset::UTC;

/// Whether the usage counter anchored at `last_reset` belongs to an earlier
/// (or, under clock skew, different) calendar day than `now`.
#[inline]
pub fn should_reset(last_reset: OffsetDateTime, now: OffsetDateTime) -> bool {
    last_reset.to_offset(QUOTA_ZONE).date() != now.to_offset(QUOTA_ZONE).date()
}

#[cfg(test)]
mod tests {
    use time::macros::{datetime, offset};

    use super::*;

    #[test]
    fn same_day_never_resets() {
        let start = datetime!(2024-05-10 00:00:00 UTC);
        let end = datetime!(2024-05-10 23:59:59.999 UTC);
        assert!(!should_reset(start, end));
        assert!(!should_reset(start, start));
    }

    #[test]
    fn next_day_resets_even_one_second_later() {
        let before = datetime!(2024-05-10 23:59:59 UTC);
        let after = datetime!(2024-05-11 00:00:00 UTC);
        assert!(should_reset(before, after));
    }

    #[test]
    fn month_and_year_boundaries_reset() {
        assert!(should_reset(
            datetime!(2024-02-29 12:00 UTC),
            datetime!(2024-03-01 12:00 UTC)
        ));
        assert!(should_reset(
            datetime!(2023-12-31 23:00 UTC),
            datetime!(2024-01-01 01:00 UTC)
        ));
    }

    #[test]
    fn same_date_different_year_resets() {
        assert!(should_reset(
            datetime!(2023-05-10 08:00 UTC),
            datetime!(2024-05-10 08:00 UTC)
        ));
    }

    #[test]
    fn local_offsets_are_normalized_to_utc() {
        // 23:30 at UTC-5 is 04:30 UTC the next day.
        let local_evening = datetime!(2024-05-10 23:30 -5);
        let utc_morning = datetime!(2024-05-11 06:00 UTC);
        assert!(!should_reset(local_evening, utc_morning));

        // Same local date, different UTC dates.
        let early = datetime!(2024-05-10 01:00 +3);
        let late = datetime!(2024-05-10 20:00 +3);
        assert_eq!(early.offset(), offset!(+3));
        assert!(should_reset(early, late));
    }

    #[test]
    fn backwards_clock_across_midnight_resets() {
        assert!(should_reset(
            datetime!(2024-05-11 00:00:01 UTC),
            datetime!(2024-05-10 23:59:58 UTC)
        ));
    }
}
