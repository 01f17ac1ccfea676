#[cfg(test)]
mod tests {
    use crate::error::BookingError;
    use crate::logic::{
        check_in_window_open, overlaps, validate_duration, validate_time_range, BookingPolicy,
    };
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, hour, minute, 0).unwrap()
    }

    #[test]
    fn overlapping_intervals_are_detected() {
        // 09:00-10:00 vs 09:30-10:30
        assert!(overlaps(at(9, 0), at(10, 0), at(9, 30), at(10, 30)));
        // Containment: 09:00-12:00 vs 10:00-11:00
        assert!(overlaps(at(9, 0), at(12, 0), at(10, 0), at(11, 0)));
        // Identical intervals
        assert!(overlaps(at(9, 0), at(10, 0), at(9, 0), at(10, 0)));
    }

    #[test]
    fn disjoint_intervals_do_not_overlap() {
        assert!(!overlaps(at(9, 0), at(10, 0), at(11, 0), at(12, 0)));
        assert!(!overlaps(at(11, 0), at(12, 0), at(9, 0), at(10, 0)));
    }

    #[test]
    fn back_to_back_intervals_do_not_overlap() {
        // Half-open policy: 09:00-10:00 then 10:00-11:00 is allowed.
        assert!(!overlaps(at(9, 0), at(10, 0), at(10, 0), at(11, 0)));
        assert!(!overlaps(at(10, 0), at(11, 0), at(9, 0), at(10, 0)));
    }

    #[test]
    fn time_range_requires_start_before_end() {
        assert!(validate_time_range(at(9, 0), at(10, 0)).is_ok());
        assert!(matches!(
            validate_time_range(at(10, 0), at(9, 0)),
            Err(BookingError::InvalidTimeRange)
        ));
        // Zero-length range is invalid too.
        assert!(matches!(
            validate_time_range(at(9, 0), at(9, 0)),
            Err(BookingError::InvalidTimeRange)
        ));
    }

    #[test]
    fn duration_below_minimum_is_rejected() {
        let min = Duration::minutes(30);
        assert!(validate_duration(at(9, 0), at(9, 30), min).is_ok());
        assert!(validate_duration(at(9, 0), at(11, 0), min).is_ok());
        assert!(matches!(
            validate_duration(at(9, 0), at(9, 29), min),
            Err(BookingError::DurationTooShort(30))
        ));
    }

    #[test]
    fn check_in_window_opens_at_lead_before_start() {
        let lead = Duration::minutes(15);
        let start = at(10, 0);

        // 20 minutes early: closed.
        assert!(!check_in_window_open(at(9, 40), start, lead));
        // Exactly at the window edge: open.
        assert!(check_in_window_open(at(9, 45), start, lead));
        // 10 minutes early: open.
        assert!(check_in_window_open(at(9, 50), start, lead));
        // After start: still open; the sweep handles no-shows.
        assert!(check_in_window_open(at(10, 20), start, lead));
    }

    #[test]
    fn policy_resolves_minutes_from_config() {
        let policy = BookingPolicy::default();
        assert_eq!(policy.min_duration, Duration::minutes(30));
        assert_eq!(policy.check_in_lead, Duration::minutes(15));
        assert_eq!(policy.missed_check_in_grace, Duration::minutes(30));
    }
}
