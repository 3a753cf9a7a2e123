//! Reservations for the padel court and the community room.
//!
//! Both facilities share one record shape and one store contract. Each has its own
//! availability engine; the engines are pure and only see the active reservations the
//! service fetched for them, so the store's uniqueness constraint stays the final word on
//! conflicts.

pub mod calendar;
pub(crate) mod cancellation;
pub mod domain;
pub mod engine;
pub mod history;
pub(crate) mod intake;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use cancellation::CancellationResolver;
pub use domain::{
    BookingRequest, BookingSubmission, BookingTarget, Building, CancellationCode, Dwelling, Floor,
    NewReservation, Occupant, ReservationId, ReservationRecord, ReservationStatus,
    ReservationView, ResourceKind, Slot, Unit,
};
pub use engine::{
    BookingRejection, BookingRules, CourtCandidate, CourtDay, DateAvailabilityEngine,
    OccupantSummary, RoomCandidate, RoomDay, SlotAvailability, SlotAvailabilityEngine,
};
pub use history::MonthlyHistory;
pub use intake::{IntakeGuard, IntakeViolation};
pub use repository::{
    cancellation_url, ConfirmationEmail, ConfirmationMailer, DateFilter, MailError,
    ReservationFilter, ReservationStore, StoreError,
};
pub use router::booking_router;
pub use service::{
    AvailabilitySnapshot, BookingReceipt, BookingReceiptView, BookingService, BookingServiceError,
};
