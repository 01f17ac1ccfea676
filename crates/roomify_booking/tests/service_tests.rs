//! Behavior tests for the reservation lifecycle, driven through the service
//! over in-memory repositories and a manual clock.


use chrono::Duration;
use fixtures::{booking, eight_am, harness, seed_room};
use roomify_booking::error::BookingError;
use roomify_booking::models::ReservationChanges;
use roomify_common::Clock;
use roomify_db::{ReservationFilter, ReservationStatus, RoomStatus};
use uuid::Uuid;

#[tokio::test]
async fn create_returns_confirmed_reservation_matching_request() {
    let h = harness();
    let room = seed_room(&h, "R-201", 30).await;
    let user = Uuid::new_v4();

    let start = eight_am() + Duration::hours(1);
    let end = start + Duration::hours(1);
    let reservation = h
        .service
        .create_reservation(booking(user, room.id, start, end))
        .await
        .unwrap();

    assert_eq!(reservation.status, ReservationStatus::Confirmed);
    assert_eq!(reservation.start_time, start);
    assert_eq!(reservation.end_time, end);
    assert_eq!(reservation.user_id, user);
    assert_eq!(reservation.participants, 1);

    // Booking alone does not occupy the room.
    let room = h.room_service.get_room(room.id).await.unwrap();
    assert_eq!(room.status, RoomStatus::Available);
}

#[tokio::test]
async fn create_rejects_inverted_or_empty_time_range() {
    let h = harness();
    let room = seed_room(&h, "R-201", 30).await;
    let user = Uuid::new_v4();
    let start = eight_am() + Duration::hours(1);

    let result = h
        .service
        .create_reservation(booking(user, room.id, start, start - Duration::hours(1)))
        .await;
    assert!(matches!(result, Err(BookingError::InvalidTimeRange)));

    let result = h
        .service
        .create_reservation(booking(user, room.id, start, start))
        .await;
    assert!(matches!(result, Err(BookingError::InvalidTimeRange)));
}

#[tokio::test]
async fn create_rejects_too_short_reservations() {
    let h = harness();
    let room = seed_room(&h, "R-201", 30).await;
    let start = eight_am() + Duration::hours(1);

    let result = h
        .service
        .create_reservation(booking(
            Uuid::new_v4(),
            room.id,
            start,
            start + Duration::minutes(20),
        ))
        .await;
    assert!(matches!(result, Err(BookingError::DurationTooShort(30))));
}

#[tokio::test]
async fn create_rejects_unknown_room() {
    let h = harness();
    let start = eight_am() + Duration::hours(1);

    let result = h
        .service
        .create_reservation(booking(
            Uuid::new_v4(),
            Uuid::new_v4(),
            start,
            start + Duration::hours(1),
        ))
        .await;
    assert!(matches!(result, Err(BookingError::RoomNotFound)));
}

#[tokio::test]
async fn create_rejects_room_not_open_for_booking() {
    let h = harness();
    let room = seed_room(&h, "R-201", 30).await;
    h.room_service
        .set_status(room.id, "maintenance")
        .await
        .unwrap();

    let start = eight_am() + Duration::hours(1);
    let result = h
        .service
        .create_reservation(booking(
            Uuid::new_v4(),
            room.id,
            start,
            start + Duration::hours(1),
        ))
        .await;
    assert!(matches!(result, Err(BookingError::RoomUnavailable)));
}

#[tokio::test]
async fn create_rejects_party_larger_than_room() {
    let h = harness();
    let room = seed_room(&h, "R-201", 30).await;
    let start = eight_am() + Duration::hours(1);

    let mut request = booking(Uuid::new_v4(), room.id, start, start + Duration::hours(1));
    request.participants = Some(31);

    let result = h.service.create_reservation(request).await;
    assert!(matches!(
        result,
        Err(BookingError::CapacityExceeded {
            requested: 31,
            capacity: 30
        })
    ));
}

// The end-to-end scenario: 09:00-10:00 books, 09:30-10:30 conflicts,
// 10:00-11:00 is back-to-back and succeeds under the half-open policy.
#[tokio::test]
async fn overlap_conflicts_but_back_to_back_is_allowed() {
    let h = harness();
    let room = seed_room(&h, "R-201", 30).await;
    let nine = eight_am() + Duration::hours(1);

    h.service
        .create_reservation(booking(
            Uuid::new_v4(),
            room.id,
            nine,
            nine + Duration::hours(1),
        ))
        .await
        .unwrap();

    let result = h
        .service
        .create_reservation(booking(
            Uuid::new_v4(),
            room.id,
            nine + Duration::minutes(30),
            nine + Duration::minutes(90),
        ))
        .await;
    assert!(matches!(result, Err(BookingError::RoomAlreadyBooked)));

    h.service
        .create_reservation(booking(
            Uuid::new_v4(),
            room.id,
            nine + Duration::hours(1),
            nine + Duration::hours(2),
        ))
        .await
        .expect("back-to-back booking should be allowed");
}

#[tokio::test]
async fn cancelled_reservations_stop_blocking_the_slot() {
    let h = harness();
    let room = seed_room(&h, "R-201", 30).await;
    let user = Uuid::new_v4();
    let start = eight_am() + Duration::hours(1);
    let end = start + Duration::hours(1);

    let first = h
        .service
        .create_reservation(booking(user, room.id, start, end))
        .await
        .unwrap();
    h.service
        .cancel_reservation(first.id, user, false)
        .await
        .unwrap();

    h.service
        .create_reservation(booking(Uuid::new_v4(), room.id, start, end))
        .await
        .expect("slot should be free again after cancellation");
}

#[tokio::test]
async fn update_requires_owner_or_admin() {
    let h = harness();
    let room = seed_room(&h, "R-201", 30).await;
    let owner = Uuid::new_v4();
    let stranger = Uuid::new_v4();
    let start = eight_am() + Duration::hours(1);

    let reservation = h
        .service
        .create_reservation(booking(owner, room.id, start, start + Duration::hours(1)))
        .await
        .unwrap();

    let changes = ReservationChanges {
        purpose: Some("Group study".to_string()),
        ..Default::default()
    };

    let result = h
        .service
        .update_reservation(reservation.id, stranger, changes.clone(), false)
        .await;
    assert!(matches!(result, Err(BookingError::Forbidden)));

    // Admins act on any reservation.
    let updated = h
        .service
        .update_reservation(reservation.id, stranger, changes, true)
        .await
        .unwrap();
    assert_eq!(updated.purpose.as_deref(), Some("Group study"));
}

#[tokio::test]
async fn reschedule_onto_occupied_slot_is_rejected() {
    let h = harness();
    let room = seed_room(&h, "R-201", 30).await;
    let user = Uuid::new_v4();
    let nine = eight_am() + Duration::hours(1);
    let eleven = nine + Duration::hours(2);

    h.service
        .create_reservation(booking(
            Uuid::new_v4(),
            room.id,
            nine,
            nine + Duration::hours(1),
        ))
        .await
        .unwrap();
    let second = h
        .service
        .create_reservation(booking(user, room.id, eleven, eleven + Duration::hours(1)))
        .await
        .unwrap();

    // Move the 11:00 booking onto the 09:00 one: conflict.
    let result = h
        .service
        .update_reservation(
            second.id,
            user,
            ReservationChanges {
                start_time: Some(nine + Duration::minutes(30)),
                end_time: Some(nine + Duration::minutes(90)),
                ..Default::default()
            },
            false,
        )
        .await;
    assert!(matches!(result, Err(BookingError::RoomAlreadyBooked)));

    // A free slot is fine, and a no-move reschedule must not conflict with
    // the reservation itself.
    let moved = h
        .service
        .update_reservation(
            second.id,
            user,
            ReservationChanges {
                start_time: Some(eleven + Duration::hours(1)),
                end_time: Some(eleven + Duration::hours(2)),
                ..Default::default()
            },
            false,
        )
        .await
        .unwrap();
    assert_eq!(moved.start_time, eleven + Duration::hours(1));
}

#[tokio::test]
async fn owner_cannot_modify_after_check_in_but_admin_can() {
    let h = harness();
    let room = seed_room(&h, "R-201", 30).await;
    let user = Uuid::new_v4();
    let start = eight_am() + Duration::minutes(10);

    let reservation = h
        .service
        .create_reservation(booking(user, room.id, start, start + Duration::hours(1)))
        .await
        .unwrap();
    h.service.check_in(reservation.id, user, false).await.unwrap();

    let changes = ReservationChanges {
        notes: Some("bring the projector".to_string()),
        ..Default::default()
    };

    let result = h
        .service
        .update_reservation(reservation.id, user, changes.clone(), false)
        .await;
    assert!(matches!(result, Err(BookingError::AlreadyCheckedIn)));

    h.service
        .update_reservation(reservation.id, user, changes, true)
        .await
        .expect("admin may modify after check-in");
}

#[tokio::test]
async fn second_cancel_fails_not_found() {
    let h = harness();
    let room = seed_room(&h, "R-201", 30).await;
    let user = Uuid::new_v4();
    let start = eight_am() + Duration::hours(1);

    let reservation = h
        .service
        .create_reservation(booking(user, room.id, start, start + Duration::hours(1)))
        .await
        .unwrap();

    h.service
        .cancel_reservation(reservation.id, user, false)
        .await
        .unwrap();

    let result = h.service.cancel_reservation(reservation.id, user, false).await;
    assert!(matches!(result, Err(BookingError::NotFound)));
}

#[tokio::test]
async fn check_in_window_opens_fifteen_minutes_before_start() {
    let h = harness();
    let room = seed_room(&h, "R-201", 30).await;
    let user = Uuid::new_v4();

    // Starts 20 minutes from now: too early.
    let start = eight_am() + Duration::minutes(20);
    let reservation = h
        .service
        .create_reservation(booking(user, room.id, start, start + Duration::hours(1)))
        .await
        .unwrap();

    let result = h.service.check_in(reservation.id, user, false).await;
    assert!(matches!(result, Err(BookingError::TooEarly(15))));

    // Ten minutes before start: inside the window.
    h.clock.advance(Duration::minutes(10));
    let checked_in = h
        .service
        .check_in(reservation.id, user, false)
        .await
        .unwrap();

    assert_eq!(checked_in.status, ReservationStatus::CheckedIn);
    assert_eq!(checked_in.check_in_time, Some(h.clock.now()));

    let room = h.room_service.get_room(room.id).await.unwrap();
    assert_eq!(room.status, RoomStatus::Occupied);
}

#[tokio::test]
async fn admin_check_in_bypasses_the_window() {
    let h = harness();
    let room = seed_room(&h, "R-201", 30).await;
    let user = Uuid::new_v4();

    let start = eight_am() + Duration::hours(3);
    let reservation = h
        .service
        .create_reservation(booking(user, room.id, start, start + Duration::hours(1)))
        .await
        .unwrap();

    h.service
        .check_in(reservation.id, user, true)
        .await
        .expect("admin bypasses the check-in window");
}

#[tokio::test]
async fn check_out_requires_a_prior_check_in() {
    let h = harness();
    let room = seed_room(&h, "R-201", 30).await;
    let user = Uuid::new_v4();
    let start = eight_am() + Duration::minutes(10);

    let reservation = h
        .service
        .create_reservation(booking(user, room.id, start, start + Duration::hours(1)))
        .await
        .unwrap();

    let result = h.service.check_out(reservation.id, user, false).await;
    assert!(matches!(result, Err(BookingError::NotCheckedIn)));

    h.service.check_in(reservation.id, user, false).await.unwrap();
    h.clock.advance(Duration::hours(1));

    let completed = h
        .service
        .check_out(reservation.id, user, false)
        .await
        .unwrap();
    assert_eq!(completed.status, ReservationStatus::Completed);
    assert_eq!(completed.check_out_time, Some(h.clock.now()));

    let room = h.room_service.get_room(room.id).await.unwrap();
    assert_eq!(room.status, RoomStatus::Available);
}

#[tokio::test]
async fn listings_filter_and_sort_by_start_time() {
    let h = harness();
    let room = seed_room(&h, "R-201", 30).await;
    let other_room = seed_room(&h, "R-202", 10).await;
    let user = Uuid::new_v4();
    let other_user = Uuid::new_v4();
    let nine = eight_am() + Duration::hours(1);

    // Created out of chronological order on purpose.
    let late = h
        .service
        .create_reservation(booking(
            user,
            room.id,
            nine + Duration::hours(4),
            nine + Duration::hours(5),
        ))
        .await
        .unwrap();
    let early = h
        .service
        .create_reservation(booking(user, room.id, nine, nine + Duration::hours(1)))
        .await
        .unwrap();
    h.service
        .create_reservation(booking(
            other_user,
            other_room.id,
            nine,
            nine + Duration::hours(1),
        ))
        .await
        .unwrap();

    let mine = h.service.user_reservations(user, None).await.unwrap();
    assert_eq!(
        mine.iter().map(|r| r.id).collect::<Vec<_>>(),
        vec![early.id, late.id]
    );

    h.service.cancel_reservation(late.id, user, false).await.unwrap();
    let cancelled = h
        .service
        .user_reservations(user, Some(ReservationStatus::Cancelled))
        .await
        .unwrap();
    assert_eq!(cancelled.len(), 1);
    assert_eq!(cancelled[0].id, late.id);

    let in_room = h
        .service
        .all_reservations(ReservationFilter {
            room_id: Some(other_room.id),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(in_room.len(), 1);
    assert_eq!(in_room[0].user_id, other_user);
}
