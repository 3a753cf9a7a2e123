use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::booking::domain::{
    BookingSubmission, Building, CancellationCode, Dwelling, Floor, NewReservation, Occupant,
    ReservationId, ReservationRecord, ReservationStatus, ResourceKind, Slot, Unit,
};
use crate::booking::repository::{
    ConfirmationEmail, ConfirmationMailer, MailError, ReservationFilter, ReservationStore,
    StoreError,
};
use crate::booking::{booking_router, BookingRules, BookingService};
use crate::config::BookingConfig;

pub(super) const ORIGIN: &str = "https://reservas.example.org";

pub(super) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub(super) fn today() -> NaiveDate {
    date(2024, 6, 10)
}

pub(super) fn rules() -> BookingRules {
    BookingRules::default()
}

pub(super) fn booking_config() -> BookingConfig {
    BookingConfig {
        app_origin: ORIGIN.to_string(),
        rules: rules(),
    }
}

pub(super) fn dwelling(building: u8, floor: Floor, unit: Unit) -> Dwelling {
    Dwelling {
        building: Building::new(building).expect("known portal"),
        floor,
        unit,
    }
}

pub(super) fn occupant(dwelling: Dwelling) -> Occupant {
    Occupant {
        first_name: "Lucía".to_string(),
        last_name: "Martín".to_string(),
        dwelling,
        phone: "600123456".to_string(),
        email: "lucia@example.com".to_string(),
    }
}

pub(super) fn court_record(
    id: &str,
    day: NaiveDate,
    slot: Slot,
    dwelling: Dwelling,
) -> ReservationRecord {
    ReservationRecord {
        id: ReservationId(id.to_string()),
        kind: ResourceKind::Court,
        date: day,
        slot: Some(slot),
        occupant: occupant(dwelling),
        reason: None,
        cancellation_code: CancellationCode(format!("code-{id}")),
        status: ReservationStatus::Active,
    }
}

pub(super) fn room_record(id: &str, day: NaiveDate, dwelling: Dwelling) -> ReservationRecord {
    ReservationRecord {
        id: ReservationId(id.to_string()),
        kind: ResourceKind::CommunityRoom,
        date: day,
        slot: None,
        occupant: occupant(dwelling),
        reason: Some("Cumpleaños".to_string()),
        cancellation_code: CancellationCode(format!("code-{id}")),
        status: ReservationStatus::Active,
    }
}

pub(super) fn court_submission(
    day: NaiveDate,
    slot: &str,
    building: u8,
    floor: &str,
    unit: &str,
) -> BookingSubmission {
    BookingSubmission {
        date: Some(day),
        slot: Some(slot.to_string()),
        first_name: "Lucía".to_string(),
        last_name: "Martín".to_string(),
        building: Some(building),
        floor: floor.to_string(),
        unit: unit.to_string(),
        phone: "600123456".to_string(),
        email: "lucia@example.com".to_string(),
        reason: None,
    }
}

pub(super) fn room_submission(
    day: NaiveDate,
    building: u8,
    floor: &str,
    unit: &str,
) -> BookingSubmission {
    BookingSubmission {
        date: Some(day),
        slot: None,
        reason: Some("Reunión familiar".to_string()),
        ..court_submission(day, "", building, floor, unit)
    }
}

pub(super) fn build_service() -> (
    BookingService<MemoryStore, MemoryMailer>,
    Arc<MemoryStore>,
    Arc<MemoryMailer>,
) {
    let store = Arc::new(MemoryStore::default());
    let mailer = Arc::new(MemoryMailer::default());
    let service = BookingService::new(store.clone(), mailer.clone(), booking_config());
    (service, store, mailer)
}

/// Mirrors the external store: unique active `(kind, date, slot)` and conditional updates.
#[derive(Default, Clone)]
pub(super) struct MemoryStore {
    records: Arc<Mutex<Vec<ReservationRecord>>>,
}

impl MemoryStore {
    pub(super) fn seed(&self, record: ReservationRecord) {
        self.records.lock().expect("store mutex poisoned").push(record);
    }

    pub(super) fn all(&self) -> Vec<ReservationRecord> {
        self.records.lock().expect("store mutex poisoned").clone()
    }
}

#[async_trait]
impl ReservationStore for MemoryStore {
    async fn select(
        &self,
        kind: ResourceKind,
        filter: &ReservationFilter,
    ) -> Result<Vec<ReservationRecord>, StoreError> {
        let guard = self.records.lock().expect("store mutex poisoned");
        let mut found: Vec<ReservationRecord> = guard
            .iter()
            .filter(|record| record.kind == kind && filter.matches(record))
            .cloned()
            .collect();
        if filter.ordered {
            found.sort_by(|a, b| (a.date, a.slot).cmp(&(b.date, b.slot)));
        }
        Ok(found)
    }

    async fn insert(&self, reservation: NewReservation) -> Result<ReservationRecord, StoreError> {
        let mut guard = self.records.lock().expect("store mutex poisoned");
        let clash = guard.iter().any(|record| {
            record.is_active()
                && record.kind == reservation.kind
                && record.date == reservation.date
                && record.slot == reservation.slot
        });
        if clash
            || guard
                .iter()
                .any(|record| record.cancellation_code == reservation.cancellation_code)
        {
            return Err(StoreError::UniqueViolation);
        }
        let id = ReservationId(format!("res-{}", guard.len() + 1));
        let record = ReservationRecord::from_new(id, reservation);
        guard.push(record.clone());
        Ok(record)
    }

    async fn update_status(
        &self,
        kind: ResourceKind,
        id: &ReservationId,
        expected: ReservationStatus,
        status: ReservationStatus,
    ) -> Result<(), StoreError> {
        let mut guard = self.records.lock().expect("store mutex poisoned");
        let record = guard
            .iter_mut()
            .find(|record| record.kind == kind && record.id == *id && record.status == expected)
            .ok_or(StoreError::NotFound)?;
        record.status = status;
        Ok(())
    }
}

/// Accepts every read but reports a lost race on insert.
pub(super) struct RacingStore;

#[async_trait]
impl ReservationStore for RacingStore {
    async fn select(
        &self,
        _kind: ResourceKind,
        _filter: &ReservationFilter,
    ) -> Result<Vec<ReservationRecord>, StoreError> {
        Ok(Vec::new())
    }

    async fn insert(&self, _reservation: NewReservation) -> Result<ReservationRecord, StoreError> {
        Err(StoreError::UniqueViolation)
    }

    async fn update_status(
        &self,
        _kind: ResourceKind,
        _id: &ReservationId,
        _expected: ReservationStatus,
        _status: ReservationStatus,
    ) -> Result<(), StoreError> {
        Err(StoreError::NotFound)
    }
}

pub(super) struct UnavailableStore;

#[async_trait]
impl ReservationStore for UnavailableStore {
    async fn select(
        &self,
        _kind: ResourceKind,
        _filter: &ReservationFilter,
    ) -> Result<Vec<ReservationRecord>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    async fn insert(&self, _reservation: NewReservation) -> Result<ReservationRecord, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    async fn update_status(
        &self,
        _kind: ResourceKind,
        _id: &ReservationId,
        _expected: ReservationStatus,
        _status: ReservationStatus,
    ) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryMailer {
    sent: Arc<Mutex<Vec<ConfirmationEmail>>>,
}

impl MemoryMailer {
    pub(super) fn sent(&self) -> Vec<ConfirmationEmail> {
        self.sent.lock().expect("mailer mutex poisoned").clone()
    }
}

#[async_trait]
impl ConfirmationMailer for MemoryMailer {
    async fn send(&self, email: ConfirmationEmail) -> Result<(), MailError> {
        self.sent.lock().expect("mailer mutex poisoned").push(email);
        Ok(())
    }
}

pub(super) struct FailingMailer;

#[async_trait]
impl ConfirmationMailer for FailingMailer {
    async fn send(&self, _email: ConfirmationEmail) -> Result<(), MailError> {
        Err(MailError::Transport("smtp relay refused".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn booking_router_with_service(
    service: BookingService<MemoryStore, MemoryMailer>,
) -> axum::Router {
    booking_router(Arc::new(service))
}
