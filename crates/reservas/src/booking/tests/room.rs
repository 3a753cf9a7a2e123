use super::common::*;
use crate::booking::calendar::{add_days, room_candidate_dates};
use crate::booking::domain::{Floor, ReservationStatus, Unit};
use crate::booking::engine::{BookingRejection, DateAvailabilityEngine, RoomCandidate};

fn engine() -> DateAvailabilityEngine {
    DateAvailabilityEngine::new(rules())
}

#[test]
fn availability_marks_occupied_dates_only() {
    let candidates = room_candidate_dates(today(), 30);
    let reservations = vec![room_record(
        "1",
        date(2024, 6, 15),
        dwelling(5, Floor::Third, Unit::A),
    )];

    let days = engine().compute_availability(&candidates, &reservations);

    assert_eq!(days.len(), 30);
    assert_eq!(days[0].date, date(2024, 6, 11));
    let occupied: Vec<_> = days.iter().filter(|day| !day.is_free()).collect();
    assert_eq!(occupied.len(), 1);
    assert_eq!(occupied[0].date, date(2024, 6, 15));
    assert_eq!(occupied[0].weekday, "Sábado");
}

#[test]
fn monthly_quota_names_the_existing_date() {
    let owner = dwelling(5, Floor::Third, Unit::A);
    let existing = vec![room_record("1", date(2024, 6, 15), owner)];
    let candidate = RoomCandidate {
        date: date(2024, 6, 28),
        dwelling: owner,
    };

    let rejection = engine()
        .validate_booking(&candidate, &existing, today())
        .expect_err("quota reached");
    assert_eq!(
        rejection,
        BookingRejection::MonthlyQuotaReached {
            date: date(2024, 6, 15)
        }
    );
    assert!(rejection.summary().contains("15 de junio de 2024"));
}

#[test]
fn quota_resets_with_the_calendar_month() {
    let owner = dwelling(5, Floor::Third, Unit::A);
    let existing = vec![room_record("1", date(2024, 6, 30), owner)];
    let candidate = RoomCandidate {
        date: date(2024, 7, 1),
        dwelling: owner,
    };
    assert!(engine()
        .validate_booking(&candidate, &existing, today())
        .is_ok());
}

#[test]
fn taken_date_is_reported_generically() {
    let existing = vec![room_record(
        "1",
        date(2024, 6, 20),
        dwelling(4, Floor::First, Unit::C),
    )];
    let candidate = RoomCandidate {
        date: date(2024, 6, 20),
        dwelling: dwelling(5, Floor::Third, Unit::A),
    };
    assert_eq!(
        engine().validate_booking(&candidate, &existing, today()),
        Err(BookingRejection::DateTaken)
    );
}

#[test]
fn same_day_and_far_future_are_outside_the_window() {
    let candidate = |day| RoomCandidate {
        date: day,
        dwelling: dwelling(6, Floor::Fourth, Unit::E),
    };
    let outside = Err(BookingRejection::OutsideRoomWindow { window_days: 30 });

    assert_eq!(
        engine().validate_booking(&candidate(today()), &[], today()),
        outside
    );
    assert_eq!(
        engine().validate_booking(&candidate(add_days(today(), 31)), &[], today()),
        outside
    );
    assert!(engine()
        .validate_booking(&candidate(add_days(today(), 1)), &[], today())
        .is_ok());
    assert!(engine()
        .validate_booking(&candidate(add_days(today(), 30)), &[], today())
        .is_ok());
}

#[test]
fn cancelled_booking_frees_the_quota() {
    let owner = dwelling(5, Floor::Third, Unit::A);
    let mut cancelled = room_record("1", date(2024, 6, 15), owner);
    cancelled.status = ReservationStatus::Cancelled;
    let candidate = RoomCandidate {
        date: date(2024, 6, 15),
        dwelling: owner,
    };
    assert!(engine()
        .validate_booking(&candidate, &[cancelled], today())
        .is_ok());
}

#[test]
fn ranges_cover_month_and_calendar() {
    assert_eq!(
        DateAvailabilityEngine::lookup_range(date(2024, 2, 14)),
        (date(2024, 2, 1), date(2024, 2, 29))
    );
    assert_eq!(
        engine().calendar_range(today()),
        (today(), date(2024, 8, 11))
    );
}
