// --- File: crates/roomify_booking/src/models.rs ---
//! Request types consumed by the service layer.

use chrono::{DateTime, Utc};
use roomify_db::{EquipmentBag, RoomType};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A booking request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateReservationRequest {
    pub user_id: Uuid,
    pub room_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub purpose: Option<String>,
    /// Defaults to 1 when omitted.
    pub participants: Option<u32>,
}

/// Partial update of an existing reservation; unset fields keep their
/// current values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReservationChanges {
    pub room_id: Option<Uuid>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub purpose: Option<String>,
    pub participants: Option<u32>,
    pub notes: Option<String>,
}

impl ReservationChanges {
    /// Whether the update moves the reservation in time or to another room,
    /// which forces a fresh conflict check.
    pub fn reschedules(&self) -> bool {
        self.room_id.is_some() || self.start_time.is_some() || self.end_time.is_some()
    }
}

/// Partial update of a room's descriptive fields. Status is deliberately
/// absent: it has its own admin entry point with its own rules.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoomChanges {
    pub name: Option<String>,
    pub capacity: Option<u32>,
    pub location: Option<String>,
    pub room_type: Option<RoomType>,
    pub equipment: Option<EquipmentBag>,
}
