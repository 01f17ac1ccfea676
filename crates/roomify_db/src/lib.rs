//! Database layer for Roomify
//!
//! A `DbClient` over a database-agnostic SQLx pool, plus the repository
//! traits and SQL implementations for rooms, reservations and users.

pub mod client;
pub mod error;
pub mod repositories;

pub use client::{DbClient, DbTransaction};
pub use error::DbError;
pub use repositories::reservation::{
    NewReservation, Reservation, ReservationFilter, ReservationRepository, ReservationStatus,
};
pub use repositories::reservation_sql::SqlReservationRepository;
pub use repositories::room::{EquipmentBag, NewRoom, Room, RoomRepository, RoomStatus, RoomType};
pub use repositories::room_sql::SqlRoomRepository;
pub use repositories::user::{NewUser, User, UserRepository, UserRole};
pub use repositories::user_sql::SqlUserRepository;
