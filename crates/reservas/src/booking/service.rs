use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{error, info, warn};

use super::calendar::{date_window, room_candidate_dates};
use super::cancellation::CancellationResolver;
use super::domain::{
    BookingSubmission, BookingTarget, CancellationCode, ReservationRecord, ReservationView,
    ResourceKind,
};
use super::engine::{
    BookingRejection, CourtCandidate, CourtDay, DateAvailabilityEngine, RoomCandidate, RoomDay,
    SlotAvailabilityEngine,
};
use super::history::MonthlyHistory;
use super::intake::{IntakeGuard, IntakeViolation};
use super::repository::{
    cancellation_url, ConfirmationEmail, ConfirmationMailer, DateFilter, ReservationFilter,
    ReservationStore, StoreError,
};
use crate::config::BookingConfig;

/// Orchestrates intake, the advisory rule checks, the store insert, and the confirmation
/// e-mail for both facilities.
pub struct BookingService<S, M> {
    store: Arc<S>,
    mailer: Arc<M>,
    guard: IntakeGuard,
    court: SlotAvailabilityEngine,
    room: DateAvailabilityEngine,
    resolver: CancellationResolver<S>,
    config: BookingConfig,
}

impl<S, M> BookingService<S, M>
where
    S: ReservationStore + 'static,
    M: ConfirmationMailer + 'static,
{
    pub fn new(store: Arc<S>, mailer: Arc<M>, config: BookingConfig) -> Self {
        Self {
            court: SlotAvailabilityEngine::new(config.rules),
            room: DateAvailabilityEngine::new(config.rules),
            resolver: CancellationResolver::new(store.clone()),
            guard: IntakeGuard,
            store,
            mailer,
            config,
        }
    }

    /// Fresh court calendar for `days` consecutive dates starting at `start`.
    pub async fn court_availability(
        &self,
        start: NaiveDate,
        days: u32,
    ) -> AvailabilitySnapshot<CourtDay> {
        let dates = date_window(start, days);
        let filter = ReservationFilter::active()
            .dates(DateFilter::In(dates.clone()))
            .ordered();

        match self.store.select(ResourceKind::Court, &filter).await {
            Ok(reservations) => {
                AvailabilitySnapshot::ready(self.court.compute_availability(&dates, &reservations))
            }
            Err(err) => {
                error!(error = %err, "court calendar unavailable");
                AvailabilitySnapshot::degraded(&err)
            }
        }
    }

    /// Fresh room calendar: tomorrow through the end of the booking window.
    pub async fn room_availability(&self, today: NaiveDate) -> AvailabilitySnapshot<RoomDay> {
        let (from, to) = self.room.calendar_range(today);
        let filter = ReservationFilter::active()
            .dates(DateFilter::Between(from, to))
            .ordered();

        match self.store.select(ResourceKind::CommunityRoom, &filter).await {
            Ok(reservations) => {
                let candidates = room_candidate_dates(today, self.config.rules.room_window_days);
                AvailabilitySnapshot::ready(
                    self.room.compute_availability(&candidates, &reservations),
                )
            }
            Err(err) => {
                error!(error = %err, "room calendar unavailable");
                AvailabilitySnapshot::degraded(&err)
            }
        }
    }

    /// Validate and commit a booking, then send the confirmation e-mail.
    ///
    /// An e-mail failure does not undo the booking; the receipt reports it so the caller
    /// can show the cancellation code directly.
    pub async fn book(
        &self,
        kind: ResourceKind,
        submission: BookingSubmission,
        today: NaiveDate,
    ) -> Result<BookingReceipt, BookingServiceError> {
        let request = self.guard.request_from_submission(kind, submission)?;
        let dwelling = request.occupant.dwelling;

        let checked = match &request.target {
            BookingTarget::Court { date, slot } => {
                let filter = ReservationFilter::active().dates(DateFilter::In(
                    SlotAvailabilityEngine::lookup_dates(*date).to_vec(),
                ));
                let existing = self.store.select(ResourceKind::Court, &filter).await?;
                let candidate = CourtCandidate {
                    date: *date,
                    slot: *slot,
                    dwelling,
                };
                self.court.validate_booking(&candidate, &existing, today)
            }
            BookingTarget::CommunityRoom { date, .. } => {
                let (from, to) = DateAvailabilityEngine::lookup_range(*date);
                let filter = ReservationFilter::active().dates(DateFilter::Between(from, to));
                let existing = self.store.select(ResourceKind::CommunityRoom, &filter).await?;
                let candidate = RoomCandidate {
                    date: *date,
                    dwelling,
                };
                self.room.validate_booking(&candidate, &existing, today)
            }
        };

        if let Err(rejection) = checked {
            warn!(
                ?kind,
                date = %request.target.date(),
                %dwelling,
                reason = rejection.code(),
                "booking rejected"
            );
            return Err(rejection.into());
        }

        let reservation = request.into_new_reservation(CancellationCode::generate());
        let record = match self.store.insert(reservation).await {
            Ok(record) => record,
            Err(StoreError::UniqueViolation) => {
                warn!(?kind, %dwelling, "booking lost the insert race");
                return Err(BookingServiceError::ConflictAtCommit(kind));
            }
            Err(other) => return Err(other.into()),
        };

        info!(
            ?kind,
            date = %record.date,
            slot = record.slot.map(|slot| slot.label()),
            %dwelling,
            "reservation created"
        );

        let url = cancellation_url(&self.config.app_origin, &record.cancellation_code);
        let email_delivered = match self
            .mailer
            .send(ConfirmationEmail::for_record(&record, url.clone()))
            .await
        {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, id = %record.id.0, "confirmation e-mail not delivered");
                false
            }
        };

        Ok(BookingReceipt {
            record,
            cancellation_url: url,
            email_delivered,
        })
    }

    /// Look up the active reservation behind a cancellation code.
    pub async fn resolve_cancellation(
        &self,
        code: &str,
    ) -> Result<ReservationRecord, BookingServiceError> {
        self.resolver.resolve(code).await
    }

    /// Resolve then cancel. A second call with the same code reports `NotFound`.
    pub async fn cancel(&self, code: &str) -> Result<ReservationRecord, BookingServiceError> {
        let record = self.resolver.resolve(code).await?;
        self.resolver.cancel(&record).await
    }

    /// Active and cancelled reservations of the month containing `month_of`.
    pub async fn history(
        &self,
        kind: ResourceKind,
        month_of: NaiveDate,
        today: NaiveDate,
    ) -> Result<MonthlyHistory, BookingServiceError> {
        let (from, to) = DateAvailabilityEngine::lookup_range(month_of);
        let filter = ReservationFilter::any_status()
            .dates(DateFilter::Between(from, to))
            .ordered();
        let records = self.store.select(kind, &filter).await?;
        Ok(MonthlyHistory::from_records(kind, month_of, records, today))
    }
}

/// Calendar payload; `degraded` marks a failed read that rendered as an empty calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AvailabilitySnapshot<T> {
    pub days: Vec<T>,
    pub degraded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> AvailabilitySnapshot<T> {
    fn ready(days: Vec<T>) -> Self {
        Self {
            days,
            degraded: false,
            error: None,
        }
    }

    fn degraded(err: &StoreError) -> Self {
        Self {
            days: Vec::new(),
            degraded: true,
            error: Some(format!("Error al cargar las reservas ({err})")),
        }
    }
}

impl AvailabilitySnapshot<CourtDay> {
    pub fn free_slot_count(&self) -> usize {
        self.days.iter().map(|day| day.free_slots().count()).sum()
    }
}

impl AvailabilitySnapshot<RoomDay> {
    pub fn available_count(&self) -> usize {
        self.days.iter().filter(|day| day.is_free()).count()
    }
}

/// Outcome of a committed booking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingReceipt {
    pub record: ReservationRecord,
    pub cancellation_url: String,
    pub email_delivered: bool,
}

impl BookingReceipt {
    pub fn acknowledgement(&self) -> String {
        if self.email_delivered {
            "¡Reserva realizada con éxito! Te hemos enviado un email de confirmación.".to_string()
        } else {
            format!(
                "La reserva se ha creado correctamente, pero ha habido un problema enviando el email de confirmación. Tu reserva está confirmada. Código de cancelación: {}",
                self.record.cancellation_code.as_str()
            )
        }
    }

    /// Response body; the code is only echoed back when the e-mail could not carry it.
    pub fn view(&self) -> BookingReceiptView {
        let fallback = !self.email_delivered;
        BookingReceiptView {
            reservation: self.record.view(),
            message: self.acknowledgement(),
            email_delivered: self.email_delivered,
            cancellation_code: fallback.then(|| self.record.cancellation_code.0.clone()),
            cancellation_url: fallback.then(|| self.cancellation_url.clone()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BookingReceiptView {
    pub reservation: ReservationView,
    pub message: String,
    pub email_delivered: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancellation_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancellation_url: Option<String>,
}

/// Error raised by the booking service.
#[derive(Debug, thiserror::Error)]
pub enum BookingServiceError {
    #[error(transparent)]
    Intake(#[from] IntakeViolation),
    #[error(transparent)]
    Rejected(#[from] BookingRejection),
    #[error("{}", conflict_message(.0))]
    ConflictAtCommit(ResourceKind),
    #[error("Reserva no encontrada o ya cancelada")]
    NotFound,
    #[error("Error de conexión con el servicio de reservas. Por favor, inténtalo de nuevo. ({0})")]
    Unavailable(String),
}

fn conflict_message(kind: &ResourceKind) -> &'static str {
    match kind {
        ResourceKind::Court => "Este horario ya ha sido reservado por otra persona. Por favor, recarga la página y selecciona otro horario.",
        ResourceKind::CommunityRoom => "Este día ya ha sido reservado. Por favor, recarga la página y selecciona otra fecha.",
    }
}

impl From<StoreError> for BookingServiceError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound => Self::NotFound,
            StoreError::Unavailable(message) => Self::Unavailable(message),
            StoreError::UniqueViolation => {
                Self::Unavailable("unexpected uniqueness violation".to_string())
            }
        }
    }
}
