//! SQL implementation of the room repository.

use crate::error::DbError;
use crate::repositories::reservation::blocking_status_sql;
use crate::repositories::room::{NewRoom, Room, RoomRepository, RoomStatus, RoomType};
use crate::repositories::{parse_uuid, to_epoch};
use crate::DbClient;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::any::AnyRow;
use sqlx::Row;
use tracing::{debug, error};
use uuid::Uuid;

/// SQL implementation of the room repository.
#[derive(Debug, Clone)]
pub struct SqlRoomRepository {
    db_client: DbClient,
}

impl SqlRoomRepository {
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }
}

const ROOM_COLUMNS: &str = "id, name, capacity, location, status, room_type, equipment";

fn room_from_row(row: &AnyRow) -> Result<Room, DbError> {
    let id: String = row.try_get("id")?;
    let capacity: i64 = row.try_get("capacity")?;
    let status: String = row.try_get("status")?;
    let room_type: String = row.try_get("room_type")?;
    let equipment: String = row.try_get("equipment")?;

    Ok(Room {
        id: parse_uuid("id", &id)?,
        name: row.try_get("name")?,
        capacity: capacity as u32,
        location: row.try_get("location")?,
        status: RoomStatus::parse(&status)
            .ok_or_else(|| DbError::CorruptRow(format!("unknown room status '{status}'")))?,
        room_type: RoomType::parse(&room_type)
            .ok_or_else(|| DbError::CorruptRow(format!("unknown room type '{room_type}'")))?,
        equipment: serde_json::from_str(&equipment)
            .map_err(|e| DbError::CorruptRow(format!("equipment column: {e}")))?,
    })
}

fn equipment_json(room_equipment: &std::collections::BTreeMap<String, u32>) -> String {
    // A string-to-integer map always serializes.
    serde_json::to_string(room_equipment).unwrap_or_else(|_| "{}".to_string())
}

#[async_trait]
impl RoomRepository for SqlRoomRepository {
    async fn init_schema(&self) -> Result<(), DbError> {
        debug!("Initializing room schema");

        let query = r#"
            CREATE TABLE IF NOT EXISTS rooms (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                capacity INTEGER NOT NULL,
                location TEXT NOT NULL,
                status TEXT NOT NULL,
                room_type TEXT NOT NULL,
                equipment TEXT NOT NULL DEFAULT '{}'
            )
        "#;

        self.db_client.execute(query).await?;
        Ok(())
    }

    async fn create(&self, new: NewRoom) -> Result<Room, DbError> {
        let room = Room {
            id: Uuid::new_v4(),
            name: new.name,
            capacity: new.capacity,
            location: new.location,
            status: RoomStatus::Available,
            room_type: new.room_type,
            equipment: new.equipment,
        };

        debug!("Creating room: {}", room.name);

        let query = r#"
            INSERT INTO rooms (id, name, capacity, location, status, room_type, equipment)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#;

        sqlx::query(query)
            .bind(room.id.to_string())
            .bind(&room.name)
            .bind(room.capacity as i64)
            .bind(&room.location)
            .bind(room.status.as_str())
            .bind(room.room_type.as_str())
            .bind(equipment_json(&room.equipment))
            .execute(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to insert room: {}", e);
                DbError::QueryError(e.to_string())
            })?;

        Ok(room)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Room>, DbError> {
        let query = format!("SELECT {ROOM_COLUMNS} FROM rooms WHERE id = $1");

        let row = sqlx::query(&query)
            .bind(id.to_string())
            .fetch_optional(self.db_client.pool())
            .await
            .map_err(|e| DbError::QueryError(e.to_string()))?;

        row.as_ref().map(room_from_row).transpose()
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Room>, DbError> {
        let query = format!("SELECT {ROOM_COLUMNS} FROM rooms WHERE name = $1");

        let row = sqlx::query(&query)
            .bind(name)
            .fetch_optional(self.db_client.pool())
            .await
            .map_err(|e| DbError::QueryError(e.to_string()))?;

        row.as_ref().map(room_from_row).transpose()
    }

    async fn list(&self) -> Result<Vec<Room>, DbError> {
        let query = format!("SELECT {ROOM_COLUMNS} FROM rooms ORDER BY name ASC");

        let rows = sqlx::query(&query)
            .fetch_all(self.db_client.pool())
            .await
            .map_err(|e| DbError::QueryError(e.to_string()))?;

        rows.iter().map(room_from_row).collect()
    }

    async fn update(&self, room: &Room) -> Result<(), DbError> {
        debug!("Updating room: {}", room.id);

        let query = r#"
            UPDATE rooms
            SET name = $1, capacity = $2, location = $3, status = $4,
                room_type = $5, equipment = $6
            WHERE id = $7
        "#;

        let result = sqlx::query(query)
            .bind(&room.name)
            .bind(room.capacity as i64)
            .bind(&room.location)
            .bind(room.status.as_str())
            .bind(room.room_type.as_str())
            .bind(equipment_json(&room.equipment))
            .bind(room.id.to_string())
            .execute(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to update room: {}", e);
                DbError::QueryError(e.to_string())
            })?;

        if result.rows_affected() < 1 {
            return Err(DbError::QueryError(format!(
                "no room row updated for {}",
                room.id
            )));
        }

        Ok(())
    }

    async fn set_status(&self, id: Uuid, status: RoomStatus) -> Result<bool, DbError> {
        debug!("Setting room {} status to {}", id, status);

        let result = sqlx::query("UPDATE rooms SET status = $1 WHERE id = $2")
            .bind(status.as_str())
            .bind(id.to_string())
            .execute(self.db_client.pool())
            .await
            .map_err(|e| DbError::QueryError(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DbError> {
        debug!("Deleting room: {}", id);

        let result = sqlx::query("DELETE FROM rooms WHERE id = $1")
            .bind(id.to_string())
            .execute(self.db_client.pool())
            .await
            .map_err(|e| DbError::QueryError(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_available(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        min_capacity: u32,
    ) -> Result<Vec<Room>, DbError> {
        debug!(
            "Finding available rooms for {} - {}, capacity >= {}",
            start, end, min_capacity
        );

        // Half-open overlap: a reservation blocks the room iff
        // reservation.start < end AND start < reservation.end.
        let query = format!(
            r#"
            SELECT {ROOM_COLUMNS} FROM rooms
            WHERE status = 'available'
              AND capacity >= $1
              AND id NOT IN (
                  SELECT room_id FROM reservations
                  WHERE status IN ({})
                    AND start_time < $3
                    AND $2 < end_time
              )
            ORDER BY name ASC
            "#,
            blocking_status_sql()
        );

        let rows = sqlx::query(&query)
            .bind(min_capacity as i64)
            .bind(to_epoch(start))
            .bind(to_epoch(end))
            .fetch_all(self.db_client.pool())
            .await
            .map_err(|e| DbError::QueryError(e.to_string()))?;

        rows.iter().map(room_from_row).collect()
    }
}
