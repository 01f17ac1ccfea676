// Declare modules within this crate
pub mod error;
pub mod logic;
#[cfg(test)]
mod logic_proptest;
#[cfg(test)]
mod logic_test;
pub mod models;
pub mod rooms;
pub mod scheduler;
pub mod service;

pub use error::BookingError;
pub use logic::BookingPolicy;
pub use models::{CreateReservationRequest, ReservationChanges, RoomChanges};
pub use rooms::RoomService;
pub use scheduler::{Scheduler, SweepReport};
pub use service::ReservationService;
