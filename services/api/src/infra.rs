use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use reservas::booking::calendar::{month_bounds, parse_month};
use reservas::booking::{
    ConfirmationEmail, ConfirmationMailer, MailError, NewReservation, ReservationFilter,
    ReservationId, ReservationRecord, ReservationStatus, ReservationStore, StoreError,
    ResourceKind,
};
use reservas::error::AppError;
use tracing::info;
use uuid::Uuid;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Process-local stand-in for the hosted reservation database.
///
/// Enforces the same constraints: one active row per `(date, slot)` on the court and per
/// `date` in the room, unique cancellation codes, and compare-and-set status updates.
#[derive(Default, Clone)]
pub(crate) struct InMemoryReservationStore {
    records: Arc<Mutex<Vec<ReservationRecord>>>,
}

impl InMemoryReservationStore {
    pub(crate) fn with_records(records: Vec<ReservationRecord>) -> Self {
        Self {
            records: Arc::new(Mutex::new(records)),
        }
    }

    /// Load a JSON array of reservation records, as exported from the hosted store.
    pub(crate) fn from_json_file(path: &Path) -> Result<Self, AppError> {
        let raw = std::fs::read(path)?;
        let records: Vec<ReservationRecord> = serde_json::from_slice(&raw).map_err(|err| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("{}: {err}", path.display()),
            )
        })?;
        Ok(Self::with_records(records))
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<ReservationRecord>>, StoreError> {
        self.records
            .lock()
            .map_err(|_| StoreError::Unavailable("reservation table lock poisoned".to_string()))
    }
}

#[async_trait]
impl ReservationStore for InMemoryReservationStore {
    async fn select(
        &self,
        kind: ResourceKind,
        filter: &ReservationFilter,
    ) -> Result<Vec<ReservationRecord>, StoreError> {
        let guard = self.lock()?;
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
        let mut guard = self.lock()?;
        let occupied = guard.iter().any(|record| {
            record.is_active()
                && record.kind == reservation.kind
                && record.date == reservation.date
                && record.slot == reservation.slot
        });
        let code_reused = guard
            .iter()
            .any(|record| record.cancellation_code == reservation.cancellation_code);
        if occupied || code_reused {
            return Err(StoreError::UniqueViolation);
        }

        let record =
            ReservationRecord::from_new(ReservationId(Uuid::new_v4().to_string()), reservation);
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
        let mut guard = self.lock()?;
        let record = guard
            .iter_mut()
            .find(|record| record.kind == kind && record.id == *id && record.status == expected)
            .ok_or(StoreError::NotFound)?;
        record.status = status;
        Ok(())
    }
}

/// Mailer used when no transactional e-mail provider is configured: logs the delivery and
/// keeps a count for the demo output.
#[derive(Default, Clone)]
pub(crate) struct TracingMailer {
    delivered: Arc<Mutex<usize>>,
}

impl TracingMailer {
    pub(crate) fn delivered(&self) -> usize {
        self.delivered.lock().map(|count| *count).unwrap_or_default()
    }
}

#[async_trait]
impl ConfirmationMailer for TracingMailer {
    async fn send(&self, email: ConfirmationEmail) -> Result<(), MailError> {
        let mut count = self
            .delivered
            .lock()
            .map_err(|_| MailError::Transport("outbox lock poisoned".to_string()))?;
        *count += 1;
        info!(
            resource = %email.resource_label,
            date = %email.date,
            hours = %email.slot_or_hours,
            building = email.building,
            "confirmation e-mail queued"
        );
        Ok(())
    }
}

/// First day of a `YYYY-MM` month.
pub(crate) fn parse_month_start(raw: &str) -> Result<NaiveDate, String> {
    let (year, month) = parse_month(raw)?;
    month_bounds(year, month)
        .map(|(first, _)| first)
        .ok_or_else(|| format!("'{raw}' is not a calendar month"))
}
