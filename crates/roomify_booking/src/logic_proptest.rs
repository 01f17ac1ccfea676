#[cfg(test)]
mod tests {
    use crate::logic::overlaps;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use proptest::prelude::*;

    // Minutes after a fixed origin, so generated intervals stay well inside
    // chrono's representable range.
    fn minute(offset: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap() + Duration::minutes(offset)
    }

    proptest! {
        // The predicate cannot depend on argument order.
        #[test]
        fn overlap_is_symmetric(
            a_start in 0..10_000i64,
            a_len in 1..500i64,
            b_start in 0..10_000i64,
            b_len in 1..500i64,
        ) {
            let a = (minute(a_start), minute(a_start + a_len));
            let b = (minute(b_start), minute(b_start + b_len));

            prop_assert_eq!(
                overlaps(a.0, a.1, b.0, b.1),
                overlaps(b.0, b.1, a.0, a.1)
            );
        }

        // Touching intervals never conflict under the half-open policy.
        #[test]
        fn touching_intervals_never_overlap(
            start in 0..10_000i64,
            first_len in 1..500i64,
            second_len in 1..500i64,
        ) {
            let boundary = start + first_len;

            prop_assert!(!overlaps(
                minute(start),
                minute(boundary),
                minute(boundary),
                minute(boundary + second_len)
            ));
        }

        // An interval nested inside another always conflicts.
        #[test]
        fn containment_always_overlaps(
            outer_start in 0..10_000i64,
            lead in 0..200i64,
            inner_len in 1..200i64,
            tail in 0..200i64,
        ) {
            let inner_start = outer_start + lead;
            let inner_end = inner_start + inner_len;
            let outer_end = inner_end + tail;

            prop_assert!(overlaps(
                minute(outer_start),
                minute(outer_end),
                minute(inner_start),
                minute(inner_end)
            ));
        }

        // A booking attempt can only conflict with something inside the
        // queried span: anything entirely before or after is ignored.
        #[test]
        fn disjoint_intervals_never_overlap(
            a_start in 0..10_000i64,
            a_len in 1..500i64,
            gap in 1..500i64,
            b_len in 1..500i64,
        ) {
            let b_start = a_start + a_len + gap;

            prop_assert!(!overlaps(
                minute(a_start),
                minute(a_start + a_len),
                minute(b_start),
                minute(b_start + b_len)
            ));
        }
    }
}
