use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::{
    CancellationCode, NewReservation, ReservationId, ReservationRecord, ReservationStatus,
    ResourceKind,
};

/// Date predicate of a store query.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DateFilter {
    #[default]
    Any,
    On(NaiveDate),
    /// Inclusive on both ends.
    Between(NaiveDate, NaiveDate),
    In(Vec<NaiveDate>),
}

impl DateFilter {
    pub fn matches(&self, date: NaiveDate) -> bool {
        match self {
            DateFilter::Any => true,
            DateFilter::On(day) => *day == date,
            DateFilter::Between(from, to) => *from <= date && date <= *to,
            DateFilter::In(days) => days.contains(&date),
        }
    }
}

/// Query shape understood by every store adapter.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReservationFilter {
    pub status: Option<ReservationStatus>,
    pub dates: DateFilter,
    pub cancellation_code: Option<CancellationCode>,
    /// Sort by `(date, slot)` ascending.
    pub ordered: bool,
}

impl ReservationFilter {
    pub fn active() -> Self {
        Self {
            status: Some(ReservationStatus::Active),
            ..Self::default()
        }
    }

    pub fn any_status() -> Self {
        Self::default()
    }

    pub fn dates(mut self, dates: DateFilter) -> Self {
        self.dates = dates;
        self
    }

    pub fn code(mut self, code: CancellationCode) -> Self {
        self.cancellation_code = Some(code);
        self
    }

    pub fn ordered(mut self) -> Self {
        self.ordered = true;
        self
    }

    pub fn matches(&self, record: &ReservationRecord) -> bool {
        self.status.map_or(true, |status| record.status == status)
            && self.dates.matches(record.date)
            && self
                .cancellation_code
                .as_ref()
                .map_or(true, |code| record.cancellation_code == *code)
    }
}

/// External reservation store, one collection per resource kind.
///
/// `insert` must reject a second active row for the same `(date, slot)` on the court or the
/// same `date` in the room with [`StoreError::UniqueViolation`].
#[async_trait]
pub trait ReservationStore: Send + Sync {
    async fn select(
        &self,
        kind: ResourceKind,
        filter: &ReservationFilter,
    ) -> Result<Vec<ReservationRecord>, StoreError>;

    async fn insert(&self, reservation: NewReservation) -> Result<ReservationRecord, StoreError>;

    /// Set `status` on the row with `id` only if it currently has `expected`; a row that is
    /// missing or in another state yields [`StoreError::NotFound`].
    async fn update_status(
        &self,
        kind: ResourceKind,
        id: &ReservationId,
        expected: ReservationStatus,
        status: ReservationStatus,
    ) -> Result<(), StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("unique constraint violated")]
    UniqueViolation,
    #[error("record not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Outbound transactional e-mail.
#[async_trait]
pub trait ConfirmationMailer: Send + Sync {
    async fn send(&self, email: ConfirmationEmail) -> Result<(), MailError>;
}

/// Template parameters for the booking confirmation e-mail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmationEmail {
    pub recipient_email: String,
    pub recipient_name: String,
    pub date: NaiveDate,
    pub resource_kind: ResourceKind,
    pub resource_label: String,
    /// `10:00 - 11:30` for the court, the room's opening hours otherwise.
    pub slot_or_hours: String,
    pub building: u8,
    pub floor: String,
    pub unit: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub cancellation_url: String,
}

impl ConfirmationEmail {
    pub fn for_record(record: &ReservationRecord, cancellation_url: String) -> Self {
        let dwelling = record.dwelling();
        Self {
            recipient_email: record.occupant.email.clone(),
            recipient_name: record.occupant.full_name(),
            date: record.date,
            resource_kind: record.kind,
            resource_label: record.kind.label().to_string(),
            slot_or_hours: record.time_range(),
            building: dwelling.building.number(),
            floor: dwelling.floor.label().to_string(),
            unit: dwelling.unit.letter().to_string(),
            reason: record.reason.clone(),
            cancellation_url,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("mail transport unavailable: {0}")]
    Transport(String),
}

/// `<origin>/#/cancelar?codigo=<code>`
pub fn cancellation_url(app_origin: &str, code: &CancellationCode) -> String {
    format!(
        "{}/#/cancelar?codigo={}",
        app_origin.trim_end_matches('/'),
        code.as_str()
    )
}
