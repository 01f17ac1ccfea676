//! Room model and repository trait.

use crate::error::DbError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Operational status of a room.
///
/// `Occupied` is derived state: it is only ever written by the reservation
/// lifecycle (check-in/check-out and the sweeps), never by admin edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomStatus {
    Available,
    Occupied,
    Maintenance,
}

impl RoomStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoomStatus::Available => "available",
            RoomStatus::Occupied => "occupied",
            RoomStatus::Maintenance => "maintenance",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "available" => Some(RoomStatus::Available),
            "occupied" => Some(RoomStatus::Occupied),
            "maintenance" => Some(RoomStatus::Maintenance),
            _ => None,
        }
    }
}

impl std::fmt::Display for RoomStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What kind of use a room is set up for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomType {
    Individual,
    Group,
    Mentoring,
}

impl RoomType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoomType::Individual => "individual",
            RoomType::Group => "group",
            RoomType::Mentoring => "mentoring",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "individual" => Some(RoomType::Individual),
            "group" => Some(RoomType::Group),
            "mentoring" => Some(RoomType::Mentoring),
            _ => None,
        }
    }
}

impl std::fmt::Display for RoomType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Open-ended equipment inventory: equipment name to quantity.
///
/// The key set is not fixed; technicians add whatever the room actually
/// contains. Quantities are unsigned, so they cannot go negative.
pub type EquipmentBag = BTreeMap<String, u32>;

/// A bookable study room.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub id: Uuid,
    pub name: String,
    pub capacity: u32,
    pub location: String,
    pub status: RoomStatus,
    pub room_type: RoomType,
    pub equipment: EquipmentBag,
}

/// Data for creating a room. New rooms start out `available`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRoom {
    pub name: String,
    pub capacity: u32,
    pub location: String,
    pub room_type: RoomType,
    #[serde(default)]
    pub equipment: EquipmentBag,
}

/// Repository for rooms.
#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// Create the backing table if it does not exist.
    async fn init_schema(&self) -> Result<(), DbError>;

    /// Insert a new room and return it.
    async fn create(&self, new: NewRoom) -> Result<Room, DbError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Room>, DbError>;

    async fn find_by_name(&self, name: &str) -> Result<Option<Room>, DbError>;

    /// All rooms, ordered by name.
    async fn list(&self) -> Result<Vec<Room>, DbError>;

    /// Persist the full room row.
    async fn update(&self, room: &Room) -> Result<(), DbError>;

    /// Set only the status column. Returns false if the room does not exist.
    async fn set_status(&self, id: Uuid, status: RoomStatus) -> Result<bool, DbError>;

    /// Delete a room. Returns false if it did not exist.
    async fn delete(&self, id: Uuid) -> Result<bool, DbError>;

    /// Rooms that are `available`, can hold at least `min_capacity` people,
    /// and have no blocking reservation overlapping `[start, end)`.
    async fn find_available(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        min_capacity: u32,
    ) -> Result<Vec<Room>, DbError>;
}
