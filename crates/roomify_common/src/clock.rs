//! Clock abstraction.
//!
//! Every time-dependent rule in the booking core (check-in windows, sweep
//! cutoffs) reads the current time through this trait instead of calling
//! `Utc::now()` directly, so tests can drive the clock deterministically.

use chrono::{DateTime, Utc};

/// A source of "now".
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// The real wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
