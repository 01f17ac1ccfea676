//! Room management: the admin/technician operations around the room table.
//!
//! Occupancy is owned by the reservation lifecycle; this service refuses to
//! set `occupied` by hand so the two writers cannot diverge.

use crate::error::BookingError;
use crate::logic;
use crate::models::RoomChanges;
use chrono::{DateTime, Utc};
use roomify_db::{
    EquipmentBag, NewRoom, ReservationRepository, Room, RoomRepository, RoomStatus,
};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

pub struct RoomService {
    rooms: Arc<dyn RoomRepository>,
    reservations: Arc<dyn ReservationRepository>,
}

impl RoomService {
    pub fn new(
        rooms: Arc<dyn RoomRepository>,
        reservations: Arc<dyn ReservationRepository>,
    ) -> Self {
        Self {
            rooms,
            reservations,
        }
    }

    /// Create a room; names are unique.
    pub async fn create_room(&self, new: NewRoom) -> Result<Room, BookingError> {
        if self.rooms.find_by_name(&new.name).await?.is_some() {
            return Err(BookingError::NameConflict);
        }

        let room = self.rooms.create(new).await?;
        info!("Room {} created ({})", room.name, room.id);
        Ok(room)
    }

    /// Update a room's descriptive fields. Renaming re-checks uniqueness.
    pub async fn update_room(&self, id: Uuid, changes: RoomChanges) -> Result<Room, BookingError> {
        let mut room = self.fetch(id).await?;

        if let Some(name) = changes.name {
            if name != room.name && self.rooms.find_by_name(&name).await?.is_some() {
                return Err(BookingError::NameConflict);
            }
            room.name = name;
        }
        if let Some(capacity) = changes.capacity {
            room.capacity = capacity;
        }
        if let Some(location) = changes.location {
            room.location = location;
        }
        if let Some(room_type) = changes.room_type {
            room.room_type = room_type;
        }
        if let Some(equipment) = changes.equipment {
            room.equipment = equipment;
        }

        self.rooms.update(&room).await?;
        Ok(room)
    }

    /// Admin status change. Accepts the textual status from the boundary;
    /// unknown values and `occupied` (lifecycle-owned) are rejected.
    pub async fn set_status(&self, id: Uuid, status: &str) -> Result<Room, BookingError> {
        let parsed = RoomStatus::parse(status)
            .ok_or_else(|| BookingError::InvalidStatus(status.to_string()))?;

        if parsed == RoomStatus::Occupied {
            return Err(BookingError::InvalidStatus(status.to_string()));
        }

        let mut room = self.fetch(id).await?;
        self.rooms.set_status(id, parsed).await?;
        room.status = parsed;

        info!("Room {} status set to {}", room.name, parsed);
        Ok(room)
    }

    /// Replace the equipment inventory.
    pub async fn update_equipment(
        &self,
        id: Uuid,
        equipment: EquipmentBag,
    ) -> Result<Room, BookingError> {
        let mut room = self.fetch(id).await?;
        room.equipment = equipment;
        self.rooms.update(&room).await?;
        Ok(room)
    }

    /// Delete a room, refused while any blocking reservation references it.
    pub async fn delete_room(&self, id: Uuid) -> Result<(), BookingError> {
        let room = self.fetch(id).await?;

        if self.reservations.has_blocking_for_room(id).await? {
            return Err(BookingError::HasActiveReservations);
        }

        self.rooms.delete(id).await?;
        info!("Room {} deleted", room.name);
        Ok(())
    }

    pub async fn get_room(&self, id: Uuid) -> Result<Room, BookingError> {
        self.fetch(id).await
    }

    pub async fn list_rooms(&self) -> Result<Vec<Room>, BookingError> {
        Ok(self.rooms.list().await?)
    }

    /// Rooms free for the whole of `[start, end)` with at least
    /// `min_capacity` seats.
    pub async fn find_available_rooms(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        min_capacity: u32,
    ) -> Result<Vec<Room>, BookingError> {
        logic::validate_time_range(start, end)?;
        Ok(self.rooms.find_available(start, end, min_capacity).await?)
    }

    async fn fetch(&self, id: Uuid) -> Result<Room, BookingError> {
        self.rooms
            .find_by_id(id)
            .await?
            .ok_or(BookingError::RoomNotFound)
    }
}
