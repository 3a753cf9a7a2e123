use std::io;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use super::calendar::{can_go_next, month_heading};
use super::domain::{ReservationRecord, ReservationStatus, ReservationView, ResourceKind};

/// Every reservation of one resource in one calendar month, split by status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyHistory {
    pub kind: ResourceKind,
    pub year: i32,
    pub month: u32,
    pub heading: String,
    pub can_go_next: bool,
    pub active: Vec<ReservationView>,
    pub cancelled: Vec<ReservationView>,
}

impl MonthlyHistory {
    pub fn from_records(
        kind: ResourceKind,
        month_of: NaiveDate,
        mut records: Vec<ReservationRecord>,
        today: NaiveDate,
    ) -> Self {
        records.sort_by(|a, b| (a.date, a.slot).cmp(&(b.date, b.slot)));

        let (active, cancelled): (Vec<_>, Vec<_>) = records
            .iter()
            .filter(|record| record.kind == kind)
            .partition(|record| record.status == ReservationStatus::Active);

        let (year, month) = (month_of.year(), month_of.month());
        Self {
            kind,
            year,
            month,
            heading: month_heading(year, month),
            can_go_next: can_go_next(year, month, today),
            active: active.into_iter().map(ReservationRecord::view).collect(),
            cancelled: cancelled.into_iter().map(ReservationRecord::view).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.active.len() + self.cancelled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// One row per reservation, active first, each group in calendar order.
    pub fn write_csv<W: io::Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut writer = csv::Writer::from_writer(writer);
        for view in self.active.iter().chain(self.cancelled.iter()) {
            writer.serialize(HistoryRow {
                fecha: view.date,
                dia: view.weekday,
                horario: &view.time_range,
                nombre: &view.occupant_name,
                vivienda: &view.dwelling,
                motivo: view.reason.as_deref().unwrap_or_default(),
                estado: view.status,
            })?;
        }
        writer.flush()?;
        Ok(())
    }
}

#[derive(Serialize)]
struct HistoryRow<'a> {
    fecha: NaiveDate,
    dia: &'a str,
    horario: &'a str,
    nombre: &'a str,
    vivienda: &'a str,
    motivo: &'a str,
    estado: &'a str,
}
