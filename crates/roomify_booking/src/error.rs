//! Domain errors for the booking core.
//!
//! Raised synchronously by the service layer; the boundary that calls into
//! this crate is responsible for mapping them to user-facing responses.

use roomify_db::DbError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BookingError {
    #[error("Start time must be before end time")]
    InvalidTimeRange,
    #[error("Reservation must be at least {0} minutes long")]
    DurationTooShort(i64),
    #[error("Room not found")]
    RoomNotFound,
    #[error("Room is not open for booking")]
    RoomUnavailable,
    #[error("Room is already booked for the requested time")]
    RoomAlreadyBooked,
    #[error("Participant count {requested} exceeds room capacity {capacity}")]
    CapacityExceeded { requested: u32, capacity: u32 },
    #[error("Reservation not found")]
    NotFound,
    #[error("Not allowed to modify this reservation")]
    Forbidden,
    #[error("Reservation has already been checked in")]
    AlreadyCheckedIn,
    #[error("Reservation has not been checked in")]
    NotCheckedIn,
    #[error("Check-in opens {0} minutes before the reservation starts")]
    TooEarly(i64),
    #[error("Invalid room status: {0}")]
    InvalidStatus(String),
    #[error("A room with this name already exists")]
    NameConflict,
    #[error("Room still has active reservations")]
    HasActiveReservations,
    #[error(transparent)]
    Database(#[from] DbError),
}
