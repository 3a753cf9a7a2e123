mod court;
mod rejection;
mod room;
mod rules;

pub use court::{CourtCandidate, SlotAvailabilityEngine};
pub use rejection::BookingRejection;
pub use room::{DateAvailabilityEngine, RoomCandidate};
pub use rules::BookingRules;

use chrono::NaiveDate;
use serde::Serialize;

use super::calendar::weekday_name;
use super::domain::{ReservationRecord, ResourceKind, Slot};

/// Who holds an occupied slot or date, as shown on the public calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OccupantSummary {
    pub name: String,
    pub dwelling: String,
}

impl From<&ReservationRecord> for OccupantSummary {
    fn from(record: &ReservationRecord) -> Self {
        Self {
            name: record.occupant.full_name(),
            dwelling: record.dwelling().to_string(),
        }
    }
}

/// One court slot on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotAvailability {
    pub slot: Slot,
    pub end: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occupied_by: Option<OccupantSummary>,
}

impl SlotAvailability {
    pub fn is_free(&self) -> bool {
        self.occupied_by.is_none()
    }
}

/// All six court slots for one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CourtDay {
    pub date: NaiveDate,
    pub weekday: &'static str,
    pub slots: Vec<SlotAvailability>,
}

impl CourtDay {
    pub fn slot(&self, slot: Slot) -> Option<&SlotAvailability> {
        self.slots.iter().find(|entry| entry.slot == slot)
    }

    pub fn free_slots(&self) -> impl Iterator<Item = Slot> + '_ {
        self.slots
            .iter()
            .filter(|entry| entry.is_free())
            .map(|entry| entry.slot)
    }
}

/// A whole-day community room entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoomDay {
    pub date: NaiveDate,
    pub weekday: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occupied_by: Option<OccupantSummary>,
}

impl RoomDay {
    pub fn is_free(&self) -> bool {
        self.occupied_by.is_none()
    }
}

fn active_of(
    kind: ResourceKind,
    reservations: &[ReservationRecord],
) -> impl Iterator<Item = &ReservationRecord> {
    reservations
        .iter()
        .filter(move |record| record.kind == kind && record.is_active())
}

fn court_day(date: NaiveDate, slots: Vec<SlotAvailability>) -> CourtDay {
    CourtDay {
        date,
        weekday: weekday_name(date),
        slots,
    }
}
