//! Pure booking rules: interval overlap, duration validation and the
//! check-in window. Everything here is side-effect free so the predicates
//! can be tested exhaustively and reused by in-memory implementations.

use crate::error::BookingError;
use chrono::{DateTime, Duration, Utc};
use roomify_config::BookingConfig;

/// Time windows the service enforces, resolved from [`BookingConfig`].
#[derive(Debug, Clone, Copy)]
pub struct BookingPolicy {
    /// Minimum reservation length.
    pub min_duration: Duration,
    /// How long before start time check-in opens.
    pub check_in_lead: Duration,
    /// Grace period after start time before a missed check-in is swept.
    pub missed_check_in_grace: Duration,
}

impl BookingPolicy {
    pub fn from_config(config: &BookingConfig) -> Self {
        Self {
            min_duration: Duration::minutes(config.min_duration_minutes),
            check_in_lead: Duration::minutes(config.check_in_lead_minutes),
            missed_check_in_grace: Duration::minutes(config.missed_check_in_grace_minutes),
        }
    }
}

impl Default for BookingPolicy {
    fn default() -> Self {
        Self::from_config(&BookingConfig::default())
    }
}

/// Half-open interval intersection: `[a_start, a_end)` and
/// `[b_start, b_end)` overlap iff each starts before the other ends.
///
/// Touching intervals (one ends exactly when the other starts) do NOT
/// overlap, so back-to-back bookings of the same room are allowed.
pub fn overlaps(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> bool {
    a_start < b_end && b_start < a_end
}

/// Start must be strictly before end.
pub fn validate_time_range(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<(), BookingError> {
    if start < end {
        Ok(())
    } else {
        Err(BookingError::InvalidTimeRange)
    }
}

/// The reservation must be at least `min_duration` long. Assumes the range
/// itself has already been validated.
pub fn validate_duration(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    min_duration: Duration,
) -> Result<(), BookingError> {
    if end - start < min_duration {
        Err(BookingError::DurationTooShort(min_duration.num_minutes()))
    } else {
        Ok(())
    }
}

/// Whether a non-admin may check in now: the window opens `lead` before the
/// reservation starts and has no upper bound here (late arrivals are the
/// sweep's concern).
pub fn check_in_window_open(
    now: DateTime<Utc>,
    start: DateTime<Utc>,
    lead: Duration,
) -> bool {
    now >= start - lead
}
