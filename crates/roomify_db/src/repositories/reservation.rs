//! Reservation model and repository trait.

use crate::error::DbError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle status of a reservation.
///
/// The canonical set; every layer filters on the same values. `Completed`
/// and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    CheckedIn,
    Completed,
    Cancelled,
}

impl ReservationStatus {
    /// Statuses that hold the room's time slot. Used by both the booking
    /// conflict check and the availability query.
    pub const BLOCKING: [ReservationStatus; 3] = [
        ReservationStatus::Pending,
        ReservationStatus::Confirmed,
        ReservationStatus::CheckedIn,
    ];

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ReservationStatus::Completed | ReservationStatus::Cancelled
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Pending => "pending",
            ReservationStatus::Confirmed => "confirmed",
            ReservationStatus::CheckedIn => "checked_in",
            ReservationStatus::Completed => "completed",
            ReservationStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(ReservationStatus::Pending),
            "confirmed" => Some(ReservationStatus::Confirmed),
            "checked_in" => Some(ReservationStatus::CheckedIn),
            "completed" => Some(ReservationStatus::Completed),
            "cancelled" => Some(ReservationStatus::Cancelled),
            _ => None,
        }
    }
}

impl std::fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// SQL fragment listing the blocking statuses, for `status IN (...)` clauses.
pub fn blocking_status_sql() -> String {
    ReservationStatus::BLOCKING
        .iter()
        .map(|s| format!("'{}'", s.as_str()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// A booking of one room by one user over a half-open interval
/// `[start_time, end_time)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    pub id: Uuid,
    pub user_id: Uuid,
    pub room_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: ReservationStatus,
    pub purpose: Option<String>,
    /// Free-form notes; the sweeps append system annotations here.
    pub notes: Option<String>,
    pub participants: u32,
    pub check_in_time: Option<DateTime<Utc>>,
    pub check_out_time: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Reservation {
    /// Append a system annotation to the notes field.
    pub fn append_note(&mut self, note: &str) {
        match &mut self.notes {
            Some(existing) => {
                existing.push('\n');
                existing.push_str(note);
            }
            None => self.notes = Some(note.to_string()),
        }
    }
}

/// Data for creating a reservation; the repository assigns the id.
#[derive(Debug, Clone)]
pub struct NewReservation {
    pub user_id: Uuid,
    pub room_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: ReservationStatus,
    pub purpose: Option<String>,
    pub participants: u32,
    pub created_at: DateTime<Utc>,
}

/// Listing filter; every field is optional and they compose with AND.
#[derive(Debug, Clone, Default)]
pub struct ReservationFilter {
    pub user_id: Option<Uuid>,
    pub room_id: Option<Uuid>,
    pub status: Option<ReservationStatus>,
    /// Only reservations starting at or after this instant.
    pub starting_from: Option<DateTime<Utc>>,
    /// Only reservations starting before this instant.
    pub starting_until: Option<DateTime<Utc>>,
}

/// Repository for reservations.
///
/// The conflict-checked operations run the overlap query and the write in a
/// single transaction, so two concurrent bookings of the same slot cannot
/// both observe "free" and both commit.
#[async_trait]
pub trait ReservationRepository: Send + Sync {
    /// Create the backing table if it does not exist.
    async fn init_schema(&self) -> Result<(), DbError>;

    /// Insert `new` unless a blocking reservation overlaps its room and
    /// interval. Returns `None` on conflict.
    async fn create_checked(&self, new: NewReservation) -> Result<Option<Reservation>, DbError>;

    /// Persist a rescheduled reservation unless a blocking reservation
    /// other than itself overlaps the new room/interval. Returns false on
    /// conflict.
    async fn reschedule_checked(&self, reservation: &Reservation) -> Result<bool, DbError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Reservation>, DbError>;

    /// Persist the full reservation row (status, notes, check-in/out times).
    async fn save(&self, reservation: &Reservation) -> Result<(), DbError>;

    /// Filtered listing, ordered by start time ascending.
    async fn list(&self, filter: &ReservationFilter) -> Result<Vec<Reservation>, DbError>;

    /// Confirmed reservations that started before `cutoff` and were never
    /// checked in.
    async fn find_missed_check_ins(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<Reservation>, DbError>;

    /// Checked-in reservations whose end time has passed.
    async fn find_overdue_check_ins(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<Reservation>, DbError>;

    /// Whether any blocking-status reservation references the room.
    async fn has_blocking_for_room(&self, room_id: Uuid) -> Result<bool, DbError>;
}
