use std::sync::Arc;

use super::common::*;
use crate::booking::cancellation::CancellationResolver;
use crate::booking::domain::{Floor, ReservationStatus, ResourceKind, Slot, Unit};
use crate::booking::BookingServiceError;

#[tokio::test]
async fn resolves_codes_in_either_collection() {
    let store = Arc::new(MemoryStore::default());
    store.seed(court_record(
        "c1",
        date(2024, 6, 12),
        Slot::T1000,
        dwelling(4, Floor::Second, Unit::B),
    ));
    store.seed(room_record(
        "r1",
        date(2024, 6, 20),
        dwelling(5, Floor::Third, Unit::A),
    ));
    let resolver = CancellationResolver::new(store);

    let court = resolver.resolve("code-c1").await.expect("court code");
    assert_eq!(court.kind, ResourceKind::Court);

    let room = resolver.resolve(" code-r1 ").await.expect("room code");
    assert_eq!(room.kind, ResourceKind::CommunityRoom);
}

#[tokio::test]
async fn unknown_or_empty_code_is_not_found() {
    let resolver = CancellationResolver::new(Arc::new(MemoryStore::default()));

    assert!(matches!(
        resolver.resolve("does-not-exist").await,
        Err(BookingServiceError::NotFound)
    ));
    assert!(matches!(
        resolver.resolve("   ").await,
        Err(BookingServiceError::NotFound)
    ));
}

#[tokio::test]
async fn cancel_is_one_way_and_not_repeatable() {
    let store = Arc::new(MemoryStore::default());
    store.seed(room_record(
        "r1",
        date(2024, 6, 20),
        dwelling(5, Floor::Third, Unit::A),
    ));
    let resolver = CancellationResolver::new(store.clone());

    let record = resolver.resolve("code-r1").await.expect("resolves");
    let cancelled = resolver.cancel(&record).await.expect("first cancel");
    assert_eq!(cancelled.status, ReservationStatus::Cancelled);
    assert_eq!(store.all()[0].status, ReservationStatus::Cancelled);

    assert!(matches!(
        resolver.cancel(&record).await,
        Err(BookingServiceError::NotFound)
    ));
    assert!(matches!(
        resolver.resolve("code-r1").await,
        Err(BookingServiceError::NotFound)
    ));
    assert_eq!(store.all().len(), 1);
}

#[tokio::test]
async fn cancelled_slot_can_be_booked_again() {
    let (service, store, _) = build_service();
    let receipt = service
        .book(
            ResourceKind::Court,
            court_submission(date(2024, 6, 12), "13:00", 4, "2", "B"),
            today(),
        )
        .await
        .expect("booking accepted");

    service
        .cancel(receipt.record.cancellation_code.as_str())
        .await
        .expect("cancelled");
    assert!(matches!(
        service.cancel(receipt.record.cancellation_code.as_str()).await,
        Err(BookingServiceError::NotFound)
    ));

    service
        .book(
            ResourceKind::Court,
            court_submission(date(2024, 6, 12), "13:00", 7, "1", "C"),
            today(),
        )
        .await
        .expect("slot free again");
    assert_eq!(store.all().len(), 2);
}

#[tokio::test]
async fn store_outage_is_not_reported_as_not_found() {
    let resolver = CancellationResolver::new(Arc::new(UnavailableStore));
    assert!(matches!(
        resolver.resolve("code").await,
        Err(BookingServiceError::Unavailable(_))
    ));
}
