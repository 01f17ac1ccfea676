//! Time-driven consistency sweep.
//!
//! Two transitions happen without user action: confirmed reservations whose
//! check-in never arrived get cancelled, and checked-in reservations whose
//! end time has passed get completed. The scheduler object owns the
//! recurring loop; tests call [`Scheduler::run_all_tasks`] directly instead
//! of waiting on wall-clock time.

use crate::error::BookingError;
use crate::service::ReservationService;
use roomify_config::SchedulerConfig;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

/// Counts of records affected by one sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    pub cancelled_count: u64,
    pub checked_out_count: u64,
}

pub struct Scheduler {
    service: Arc<ReservationService>,
    interval: Duration,
}

impl Scheduler {
    pub fn new(service: Arc<ReservationService>, interval: Duration) -> Self {
        Self { service, interval }
    }

    pub fn from_config(service: Arc<ReservationService>, config: &SchedulerConfig) -> Self {
        Self::new(service, Duration::from_secs(config.sweep_interval_secs))
    }

    /// Run both sweeps, auto-cancel first, and report how many records each
    /// touched. Errors abort the remainder of the sweep; records already
    /// written stay written, and the next tick picks up whatever is still
    /// overdue.
    pub async fn run_all_tasks(&self) -> Result<SweepReport, BookingError> {
        let cancelled_count = self.service.auto_cancel_missed_check_ins().await?;
        let checked_out_count = self.service.auto_complete_overdue().await?;
        Ok(SweepReport {
            cancelled_count,
            checked_out_count,
        })
    }

    /// Background task that runs the sweep on a fixed interval. A failed
    /// sweep is logged and retried at the next tick; there is no
    /// cross-invocation state to lose.
    pub fn start(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.interval);
            loop {
                interval.tick().await;
                match self.run_all_tasks().await {
                    Ok(report) if report.cancelled_count > 0 || report.checked_out_count > 0 => {
                        info!(
                            "Sweep done: {} auto-cancelled, {} auto-checked-out",
                            report.cancelled_count, report.checked_out_count
                        );
                    }
                    Ok(_) => debug!("Sweep done: nothing overdue"),
                    Err(e) => error!("Sweep failed, retrying next tick: {e}"),
                }
            }
        })
    }
}
