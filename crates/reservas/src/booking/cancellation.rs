use std::sync::Arc;

use tracing::info;

use super::domain::{CancellationCode, ReservationRecord, ReservationStatus, ResourceKind};
use super::repository::{ReservationFilter, ReservationStore, StoreError};
use super::service::BookingServiceError;

/// Finds the active reservation behind a cancellation code and retires it.
///
/// Codes are unique across both collections; the court is searched first.
pub struct CancellationResolver<S> {
    store: Arc<S>,
}

impl<S> CancellationResolver<S>
where
    S: ReservationStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub async fn resolve(&self, code: &str) -> Result<ReservationRecord, BookingServiceError> {
        let code = code.trim();
        if code.is_empty() {
            return Err(BookingServiceError::NotFound);
        }

        let filter = ReservationFilter::active().code(CancellationCode(code.to_string()));
        for kind in ResourceKind::ALL {
            let found = self.store.select(kind, &filter).await?;
            if let Some(record) = found.into_iter().next() {
                return Ok(record);
            }
        }
        Err(BookingServiceError::NotFound)
    }

    /// Active → Cancelled. A record that is already cancelled (or gone) reports `NotFound`.
    pub async fn cancel(
        &self,
        record: &ReservationRecord,
    ) -> Result<ReservationRecord, BookingServiceError> {
        self.store
            .update_status(
                record.kind,
                &record.id,
                ReservationStatus::Active,
                ReservationStatus::Cancelled,
            )
            .await
            .map_err(|err| match err {
                StoreError::NotFound => BookingServiceError::NotFound,
                other => BookingServiceError::from(other),
            })?;

        info!(
            kind = ?record.kind,
            date = %record.date,
            dwelling = %record.dwelling(),
            "reservation cancelled"
        );

        let mut cancelled = record.clone();
        cancelled.status = ReservationStatus::Cancelled;
        Ok(cancelled)
    }
}
