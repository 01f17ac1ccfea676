//! SQL implementation of the reservation repository.
//!
//! The conflict-checked writes run their overlap query and the insert/update
//! inside one transaction, which is what closes the check-then-write race
//! between two concurrent bookings of the same slot.

use crate::error::DbError;
use crate::repositories::reservation::{
    blocking_status_sql, NewReservation, Reservation, ReservationFilter, ReservationRepository,
    ReservationStatus,
};
use crate::repositories::{from_epoch, parse_uuid, to_epoch};
use crate::DbClient;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::any::AnyRow;
use sqlx::Row;
use tracing::{debug, error};
use uuid::Uuid;

/// SQL implementation of the reservation repository.
#[derive(Debug, Clone)]
pub struct SqlReservationRepository {
    db_client: DbClient,
}

impl SqlReservationRepository {
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }
}

const RESERVATION_COLUMNS: &str = "id, user_id, room_id, start_time, end_time, status, \
     purpose, notes, participants, check_in_time, check_out_time, created_at";

fn reservation_from_row(row: &AnyRow) -> Result<Reservation, DbError> {
    let id: String = row.try_get("id")?;
    let user_id: String = row.try_get("user_id")?;
    let room_id: String = row.try_get("room_id")?;
    let start_time: i64 = row.try_get("start_time")?;
    let end_time: i64 = row.try_get("end_time")?;
    let status: String = row.try_get("status")?;
    let participants: i64 = row.try_get("participants")?;
    let check_in_time: Option<i64> = row.try_get("check_in_time")?;
    let check_out_time: Option<i64> = row.try_get("check_out_time")?;
    let created_at: i64 = row.try_get("created_at")?;

    Ok(Reservation {
        id: parse_uuid("id", &id)?,
        user_id: parse_uuid("user_id", &user_id)?,
        room_id: parse_uuid("room_id", &room_id)?,
        start_time: from_epoch("start_time", start_time)?,
        end_time: from_epoch("end_time", end_time)?,
        status: ReservationStatus::parse(&status).ok_or_else(|| {
            DbError::CorruptRow(format!("unknown reservation status '{status}'"))
        })?,
        purpose: row.try_get("purpose")?,
        notes: row.try_get("notes")?,
        participants: participants as u32,
        check_in_time: check_in_time
            .map(|secs| from_epoch("check_in_time", secs))
            .transpose()?,
        check_out_time: check_out_time
            .map(|secs| from_epoch("check_out_time", secs))
            .transpose()?,
        created_at: from_epoch("created_at", created_at)?,
    })
}

#[async_trait]
impl ReservationRepository for SqlReservationRepository {
    async fn init_schema(&self) -> Result<(), DbError> {
        debug!("Initializing reservation schema");

        let query = r#"
            CREATE TABLE IF NOT EXISTS reservations (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL REFERENCES users(id),
                room_id TEXT NOT NULL REFERENCES rooms(id),
                start_time INTEGER NOT NULL,
                end_time INTEGER NOT NULL,
                status TEXT NOT NULL,
                purpose TEXT,
                notes TEXT,
                participants INTEGER NOT NULL,
                check_in_time INTEGER,
                check_out_time INTEGER,
                created_at INTEGER NOT NULL
            )
        "#;

        self.db_client.execute(query).await?;
        self.db_client
            .execute(
                "CREATE INDEX IF NOT EXISTS idx_reservations_room_start \
                 ON reservations (room_id, start_time)",
            )
            .await?;
        Ok(())
    }

    async fn create_checked(&self, new: NewReservation) -> Result<Option<Reservation>, DbError> {
        let reservation = Reservation {
            id: Uuid::new_v4(),
            user_id: new.user_id,
            room_id: new.room_id,
            start_time: new.start_time,
            end_time: new.end_time,
            status: new.status,
            purpose: new.purpose,
            notes: None,
            participants: new.participants,
            check_in_time: None,
            check_out_time: None,
            created_at: new.created_at,
        };

        debug!(
            "Creating reservation for room {} {} - {}",
            reservation.room_id, reservation.start_time, reservation.end_time
        );

        let mut tx = self.db_client.begin().await?;

        let conflict_sql = format!(
            "SELECT id FROM reservations \
             WHERE room_id = $1 AND status IN ({}) \
               AND start_time < $3 AND $2 < end_time \
             LIMIT 1",
            blocking_status_sql()
        );

        let conflict = sqlx::query(&conflict_sql)
            .bind(reservation.room_id.to_string())
            .bind(to_epoch(reservation.start_time))
            .bind(to_epoch(reservation.end_time))
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| DbError::QueryError(e.to_string()))?;

        if conflict.is_some() {
            tx.rollback()
                .await
                .map_err(|e| DbError::TransactionError(e.to_string()))?;
            return Ok(None);
        }

        let insert_sql = r#"
            INSERT INTO reservations
                (id, user_id, room_id, start_time, end_time, status,
                 purpose, notes, participants, check_in_time, check_out_time, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        "#;

        sqlx::query(insert_sql)
            .bind(reservation.id.to_string())
            .bind(reservation.user_id.to_string())
            .bind(reservation.room_id.to_string())
            .bind(to_epoch(reservation.start_time))
            .bind(to_epoch(reservation.end_time))
            .bind(reservation.status.as_str())
            .bind(reservation.purpose.clone())
            .bind(reservation.notes.clone())
            .bind(reservation.participants as i64)
            .bind(reservation.check_in_time.map(to_epoch))
            .bind(reservation.check_out_time.map(to_epoch))
            .bind(to_epoch(reservation.created_at))
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                error!("Failed to insert reservation: {}", e);
                DbError::QueryError(e.to_string())
            })?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionError(e.to_string()))?;

        Ok(Some(reservation))
    }

    async fn reschedule_checked(&self, reservation: &Reservation) -> Result<bool, DbError> {
        debug!(
            "Rescheduling reservation {} to room {} {} - {}",
            reservation.id, reservation.room_id, reservation.start_time, reservation.end_time
        );

        let mut tx = self.db_client.begin().await?;

        let conflict_sql = format!(
            "SELECT id FROM reservations \
             WHERE room_id = $1 AND status IN ({}) \
               AND start_time < $3 AND $2 < end_time \
               AND id <> $4 \
             LIMIT 1",
            blocking_status_sql()
        );

        let conflict = sqlx::query(&conflict_sql)
            .bind(reservation.room_id.to_string())
            .bind(to_epoch(reservation.start_time))
            .bind(to_epoch(reservation.end_time))
            .bind(reservation.id.to_string())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| DbError::QueryError(e.to_string()))?;

        if conflict.is_some() {
            tx.rollback()
                .await
                .map_err(|e| DbError::TransactionError(e.to_string()))?;
            return Ok(false);
        }

        let result = sqlx::query(update_sql())
            .bind(reservation.user_id.to_string())
            .bind(reservation.room_id.to_string())
            .bind(to_epoch(reservation.start_time))
            .bind(to_epoch(reservation.end_time))
            .bind(reservation.status.as_str())
            .bind(reservation.purpose.clone())
            .bind(reservation.notes.clone())
            .bind(reservation.participants as i64)
            .bind(reservation.check_in_time.map(to_epoch))
            .bind(reservation.check_out_time.map(to_epoch))
            .bind(reservation.id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| DbError::QueryError(e.to_string()))?;

        if result.rows_affected() < 1 {
            tx.rollback()
                .await
                .map_err(|e| DbError::TransactionError(e.to_string()))?;
            return Err(DbError::QueryError(format!(
                "no reservation row updated for {}",
                reservation.id
            )));
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionError(e.to_string()))?;

        Ok(true)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Reservation>, DbError> {
        let query = format!("SELECT {RESERVATION_COLUMNS} FROM reservations WHERE id = $1");

        let row = sqlx::query(&query)
            .bind(id.to_string())
            .fetch_optional(self.db_client.pool())
            .await
            .map_err(|e| DbError::QueryError(e.to_string()))?;

        row.as_ref().map(reservation_from_row).transpose()
    }

    async fn save(&self, reservation: &Reservation) -> Result<(), DbError> {
        debug!("Saving reservation {}", reservation.id);

        let result = sqlx::query(update_sql())
            .bind(reservation.user_id.to_string())
            .bind(reservation.room_id.to_string())
            .bind(to_epoch(reservation.start_time))
            .bind(to_epoch(reservation.end_time))
            .bind(reservation.status.as_str())
            .bind(reservation.purpose.clone())
            .bind(reservation.notes.clone())
            .bind(reservation.participants as i64)
            .bind(reservation.check_in_time.map(to_epoch))
            .bind(reservation.check_out_time.map(to_epoch))
            .bind(reservation.id.to_string())
            .execute(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to save reservation: {}", e);
                DbError::QueryError(e.to_string())
            })?;

        if result.rows_affected() < 1 {
            return Err(DbError::QueryError(format!(
                "no reservation row updated for {}",
                reservation.id
            )));
        }

        Ok(())
    }

    async fn list(&self, filter: &ReservationFilter) -> Result<Vec<Reservation>, DbError> {
        let mut clauses: Vec<String> = Vec::new();
        let mut n = 0usize;

        if filter.user_id.is_some() {
            n += 1;
            clauses.push(format!("user_id = ${n}"));
        }
        if filter.room_id.is_some() {
            n += 1;
            clauses.push(format!("room_id = ${n}"));
        }
        if filter.status.is_some() {
            n += 1;
            clauses.push(format!("status = ${n}"));
        }
        if filter.starting_from.is_some() {
            n += 1;
            clauses.push(format!("start_time >= ${n}"));
        }
        if filter.starting_until.is_some() {
            n += 1;
            clauses.push(format!("start_time < ${n}"));
        }

        let where_sql = if clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", clauses.join(" AND "))
        };

        let query = format!(
            "SELECT {RESERVATION_COLUMNS} FROM reservations {where_sql} ORDER BY start_time ASC"
        );

        let mut q = sqlx::query(&query);
        if let Some(user_id) = filter.user_id {
            q = q.bind(user_id.to_string());
        }
        if let Some(room_id) = filter.room_id {
            q = q.bind(room_id.to_string());
        }
        if let Some(status) = filter.status {
            q = q.bind(status.as_str());
        }
        if let Some(from) = filter.starting_from {
            q = q.bind(to_epoch(from));
        }
        if let Some(until) = filter.starting_until {
            q = q.bind(to_epoch(until));
        }

        let rows = q
            .fetch_all(self.db_client.pool())
            .await
            .map_err(|e| DbError::QueryError(e.to_string()))?;

        rows.iter().map(reservation_from_row).collect()
    }

    async fn find_missed_check_ins(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<Reservation>, DbError> {
        let query = format!(
            "SELECT {RESERVATION_COLUMNS} FROM reservations \
             WHERE status = 'confirmed' AND start_time < $1 AND check_in_time IS NULL \
             ORDER BY start_time ASC"
        );

        let rows = sqlx::query(&query)
            .bind(to_epoch(cutoff))
            .fetch_all(self.db_client.pool())
            .await
            .map_err(|e| DbError::QueryError(e.to_string()))?;

        rows.iter().map(reservation_from_row).collect()
    }

    async fn find_overdue_check_ins(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<Reservation>, DbError> {
        let query = format!(
            "SELECT {RESERVATION_COLUMNS} FROM reservations \
             WHERE status = 'checked_in' AND end_time < $1 \
             ORDER BY end_time ASC"
        );

        let rows = sqlx::query(&query)
            .bind(to_epoch(now))
            .fetch_all(self.db_client.pool())
            .await
            .map_err(|e| DbError::QueryError(e.to_string()))?;

        rows.iter().map(reservation_from_row).collect()
    }

    async fn has_blocking_for_room(&self, room_id: Uuid) -> Result<bool, DbError> {
        let query = format!(
            "SELECT id FROM reservations WHERE room_id = $1 AND status IN ({}) LIMIT 1",
            blocking_status_sql()
        );

        let row = sqlx::query(&query)
            .bind(room_id.to_string())
            .fetch_optional(self.db_client.pool())
            .await
            .map_err(|e| DbError::QueryError(e.to_string()))?;

        Ok(row.is_some())
    }
}

fn update_sql() -> &'static str {
    r#"
        UPDATE reservations
        SET user_id = $1, room_id = $2, start_time = $3, end_time = $4,
            status = $5, purpose = $6, notes = $7, participants = $8,
            check_in_time = $9, check_out_time = $10
        WHERE id = $11
    "#
}
