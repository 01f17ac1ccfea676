//! Wiring: config to repositories to services to scheduler.

use roomify_booking::{BookingPolicy, ReservationService, RoomService, Scheduler};
use roomify_common::SystemClock;
use roomify_config::AppConfig;
use roomify_db::{
    DbClient, DbError, ReservationRepository, RoomRepository, SqlReservationRepository,
    SqlRoomRepository, SqlUserRepository, UserRepository,
};
use std::sync::Arc;

pub struct AppState {
    pub reservation_service: Arc<ReservationService>,
    pub room_service: Arc<RoomService>,
    pub users: Arc<dyn UserRepository>,
    pub scheduler: Arc<Scheduler>,
}

impl AppState {
    pub async fn build(config: Arc<AppConfig>) -> Result<Self, DbError> {
        let db_client = DbClient::new(&config).await?;

        let rooms: Arc<dyn RoomRepository> = Arc::new(SqlRoomRepository::new(db_client.clone()));
        let reservations: Arc<dyn ReservationRepository> =
            Arc::new(SqlReservationRepository::new(db_client.clone()));
        let users: Arc<dyn UserRepository> = Arc::new(SqlUserRepository::new(db_client));

        // Users before reservations: the reservation table references both
        // users and rooms.
        users.init_schema().await?;
        rooms.init_schema().await?;
        reservations.init_schema().await?;

        let policy = BookingPolicy::from_config(&config.booking);
        let reservation_service = Arc::new(ReservationService::new(
            rooms.clone(),
            reservations.clone(),
            Arc::new(SystemClock),
            policy,
        ));
        let room_service = Arc::new(RoomService::new(rooms, reservations));
        let scheduler = Arc::new(Scheduler::from_config(
            reservation_service.clone(),
            &config.scheduler,
        ));

        Ok(Self {
            reservation_service,
            room_service,
            users,
            scheduler,
        })
    }
}
