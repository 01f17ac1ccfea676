//! Reservation lifecycle service.
//!
//! The only component allowed to mutate reservation and room status
//! together. Controllers and the scheduler both come through here, so the
//! booking rules live in exactly one place.

use crate::error::BookingError;
use crate::logic::{self, BookingPolicy};
use crate::models::{CreateReservationRequest, ReservationChanges};
use roomify_common::Clock;
use roomify_db::{
    NewReservation, Reservation, ReservationFilter, ReservationRepository, ReservationStatus,
    RoomRepository, RoomStatus,
};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

pub struct ReservationService {
    rooms: Arc<dyn RoomRepository>,
    reservations: Arc<dyn ReservationRepository>,
    clock: Arc<dyn Clock>,
    policy: BookingPolicy,
}

impl ReservationService {
    pub fn new(
        rooms: Arc<dyn RoomRepository>,
        reservations: Arc<dyn ReservationRepository>,
        clock: Arc<dyn Clock>,
        policy: BookingPolicy,
    ) -> Self {
        Self {
            rooms,
            reservations,
            clock,
            policy,
        }
    }

    // --- Booking ---

    /// Book a room.
    ///
    /// Validation order: time range, duration, room existence, room
    /// availability, capacity; the overlap check runs last, inside the
    /// repository transaction that also performs the insert. New
    /// reservations are created `confirmed` and have no effect on room
    /// status; occupancy changes only at check-in.
    pub async fn create_reservation(
        &self,
        request: CreateReservationRequest,
    ) -> Result<Reservation, BookingError> {
        logic::validate_time_range(request.start_time, request.end_time)?;
        logic::validate_duration(request.start_time, request.end_time, self.policy.min_duration)?;

        let room = self
            .rooms
            .find_by_id(request.room_id)
            .await?
            .ok_or(BookingError::RoomNotFound)?;

        if room.status != RoomStatus::Available {
            return Err(BookingError::RoomUnavailable);
        }

        let participants = request.participants.unwrap_or(1).max(1);
        if participants > room.capacity {
            return Err(BookingError::CapacityExceeded {
                requested: participants,
                capacity: room.capacity,
            });
        }

        let new = NewReservation {
            user_id: request.user_id,
            room_id: request.room_id,
            start_time: request.start_time,
            end_time: request.end_time,
            status: ReservationStatus::Confirmed,
            purpose: request.purpose,
            participants,
            created_at: self.clock.now(),
        };

        let reservation = self
            .reservations
            .create_checked(new)
            .await?
            .ok_or(BookingError::RoomAlreadyBooked)?;

        info!(
            "Reservation {} created: room {} {} - {}",
            reservation.id, reservation.room_id, reservation.start_time, reservation.end_time
        );
        Ok(reservation)
    }

    /// Modify an existing reservation. Moving it in time or to another room
    /// re-runs the conflict check, excluding the reservation itself.
    pub async fn update_reservation(
        &self,
        id: Uuid,
        caller: Uuid,
        changes: ReservationChanges,
        is_admin: bool,
    ) -> Result<Reservation, BookingError> {
        let mut reservation = self.fetch_active(id).await?;
        authorize(&reservation, caller, is_admin)?;

        if reservation.check_in_time.is_some() && !is_admin {
            return Err(BookingError::AlreadyCheckedIn);
        }

        let reschedules = changes.reschedules();

        if let Some(room_id) = changes.room_id {
            reservation.room_id = room_id;
        }
        if let Some(start_time) = changes.start_time {
            reservation.start_time = start_time;
        }
        if let Some(end_time) = changes.end_time {
            reservation.end_time = end_time;
        }
        if let Some(purpose) = changes.purpose {
            reservation.purpose = Some(purpose);
        }
        if let Some(notes) = changes.notes {
            reservation.notes = Some(notes);
        }
        if let Some(participants) = changes.participants {
            reservation.participants = participants.max(1);
        }

        logic::validate_time_range(reservation.start_time, reservation.end_time)?;
        logic::validate_duration(
            reservation.start_time,
            reservation.end_time,
            self.policy.min_duration,
        )?;

        // The target room must still exist and hold the party, whether or
        // not it changed.
        let room = self
            .rooms
            .find_by_id(reservation.room_id)
            .await?
            .ok_or(BookingError::RoomNotFound)?;
        if changes.room_id.is_some() && room.status != RoomStatus::Available {
            return Err(BookingError::RoomUnavailable);
        }
        if reservation.participants > room.capacity {
            return Err(BookingError::CapacityExceeded {
                requested: reservation.participants,
                capacity: room.capacity,
            });
        }

        if reschedules {
            if !self.reservations.reschedule_checked(&reservation).await? {
                return Err(BookingError::RoomAlreadyBooked);
            }
        } else {
            self.reservations.save(&reservation).await?;
        }

        debug!("Reservation {} updated", reservation.id);
        Ok(reservation)
    }

    /// Cancel a reservation. A second cancel fails with `NotFound`: once
    /// terminal, the reservation is no longer addressable by lifecycle
    /// calls. An admin cancelling a checked-in reservation releases the
    /// room.
    pub async fn cancel_reservation(
        &self,
        id: Uuid,
        caller: Uuid,
        is_admin: bool,
    ) -> Result<(), BookingError> {
        let mut reservation = self.fetch_active(id).await?;
        authorize(&reservation, caller, is_admin)?;

        if reservation.check_in_time.is_some() && !is_admin {
            return Err(BookingError::AlreadyCheckedIn);
        }

        let was_checked_in = reservation.status == ReservationStatus::CheckedIn;
        reservation.status = ReservationStatus::Cancelled;
        self.reservations.save(&reservation).await?;

        if was_checked_in {
            self.rooms
                .set_status(reservation.room_id, RoomStatus::Available)
                .await?;
        }

        info!("Reservation {} cancelled", reservation.id);
        Ok(())
    }

    // --- Check-in / check-out ---

    /// Check in to a reservation. Non-admins may do so starting
    /// `check_in_lead` before the start time; admins bypass the window.
    /// Marks the room occupied.
    pub async fn check_in(
        &self,
        id: Uuid,
        caller: Uuid,
        is_admin: bool,
    ) -> Result<Reservation, BookingError> {
        let mut reservation = self.fetch_active(id).await?;
        authorize(&reservation, caller, is_admin)?;

        if reservation.check_in_time.is_some() {
            return Err(BookingError::AlreadyCheckedIn);
        }

        let now = self.clock.now();
        if !is_admin
            && !logic::check_in_window_open(now, reservation.start_time, self.policy.check_in_lead)
        {
            return Err(BookingError::TooEarly(
                self.policy.check_in_lead.num_minutes(),
            ));
        }

        reservation.check_in_time = Some(now);
        reservation.status = ReservationStatus::CheckedIn;
        self.reservations.save(&reservation).await?;
        self.rooms
            .set_status(reservation.room_id, RoomStatus::Occupied)
            .await?;

        info!("Reservation {} checked in", reservation.id);
        Ok(reservation)
    }

    /// Check out of a reservation. Completes it and releases the room.
    pub async fn check_out(
        &self,
        id: Uuid,
        caller: Uuid,
        is_admin: bool,
    ) -> Result<Reservation, BookingError> {
        let mut reservation = self.fetch_active(id).await?;
        authorize(&reservation, caller, is_admin)?;

        if reservation.check_in_time.is_none() {
            return Err(BookingError::NotCheckedIn);
        }

        let now = self.clock.now();
        reservation.check_out_time = Some(now);
        reservation.status = ReservationStatus::Completed;
        self.reservations.save(&reservation).await?;
        self.rooms
            .set_status(reservation.room_id, RoomStatus::Available)
            .await?;

        info!("Reservation {} checked out", reservation.id);
        Ok(reservation)
    }

    // --- Listings ---

    /// A user's reservations, optionally narrowed to one status, ordered by
    /// start time.
    pub async fn user_reservations(
        &self,
        user_id: Uuid,
        status: Option<ReservationStatus>,
    ) -> Result<Vec<Reservation>, BookingError> {
        let filter = ReservationFilter {
            user_id: Some(user_id),
            status,
            ..Default::default()
        };
        Ok(self.reservations.list(&filter).await?)
    }

    /// Filtered listing across all users, ordered by start time.
    pub async fn all_reservations(
        &self,
        filter: ReservationFilter,
    ) -> Result<Vec<Reservation>, BookingError> {
        Ok(self.reservations.list(&filter).await?)
    }

    // --- Sweep primitives (called by the scheduler) ---

    /// Cancel every confirmed reservation whose start time is more than the
    /// grace period in the past and which was never checked in. If the
    /// room is currently marked occupied it is reset to available. Returns
    /// the number of reservations cancelled.
    pub async fn auto_cancel_missed_check_ins(&self) -> Result<u64, BookingError> {
        let now = self.clock.now();
        let cutoff = now - self.policy.missed_check_in_grace;
        let missed = self.reservations.find_missed_check_ins(cutoff).await?;

        let mut cancelled = 0u64;
        for mut reservation in missed {
            reservation.status = ReservationStatus::Cancelled;
            reservation.append_note(&format!(
                "Automatically cancelled: no check-in within {} minutes of start time",
                self.policy.missed_check_in_grace.num_minutes()
            ));
            self.reservations.save(&reservation).await?;

            if let Some(room) = self.rooms.find_by_id(reservation.room_id).await? {
                if room.status == RoomStatus::Occupied {
                    self.rooms
                        .set_status(room.id, RoomStatus::Available)
                        .await?;
                }
            }

            info!(
                "Reservation {} auto-cancelled (missed check-in)",
                reservation.id
            );
            cancelled += 1;
        }
        Ok(cancelled)
    }

    /// Complete every checked-in reservation whose end time has passed,
    /// recording the check-out time and releasing the room. Returns the
    /// number of reservations completed.
    pub async fn auto_complete_overdue(&self) -> Result<u64, BookingError> {
        let now = self.clock.now();
        let overdue = self.reservations.find_overdue_check_ins(now).await?;

        let mut completed = 0u64;
        for mut reservation in overdue {
            reservation.status = ReservationStatus::Completed;
            reservation.check_out_time = Some(now);
            reservation.append_note("Automatically checked out at end of reservation");
            self.reservations.save(&reservation).await?;
            self.rooms
                .set_status(reservation.room_id, RoomStatus::Available)
                .await?;

            info!(
                "Reservation {} auto-completed (overdue check-out)",
                reservation.id
            );
            completed += 1;
        }
        Ok(completed)
    }

    /// Look up a reservation that is still addressable by lifecycle calls.
    /// Terminal reservations answer `NotFound`, which is what makes
    /// repeated cancels and check-ins fail predictably.
    async fn fetch_active(&self, id: Uuid) -> Result<Reservation, BookingError> {
        let reservation = self
            .reservations
            .find_by_id(id)
            .await?
            .ok_or(BookingError::NotFound)?;

        if reservation.status.is_terminal() {
            return Err(BookingError::NotFound);
        }
        Ok(reservation)
    }
}

fn authorize(reservation: &Reservation, caller: Uuid, is_admin: bool) -> Result<(), BookingError> {
    if is_admin || reservation.user_id == caller {
        Ok(())
    } else {
        Err(BookingError::Forbidden)
    }
}
