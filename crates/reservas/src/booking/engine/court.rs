use chrono::NaiveDate;

use super::super::calendar::add_days;
use super::super::domain::{Dwelling, ReservationRecord, ResourceKind, Slot};
use super::{
    active_of, court_day, BookingRejection, BookingRules, CourtDay, OccupantSummary,
    SlotAvailability,
};

/// A court booking candidate reduced to the fields the rules look at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CourtCandidate {
    pub date: NaiveDate,
    pub slot: Slot,
    pub dwelling: Dwelling,
}

/// Slot occupancy and the adjacency rules for the padel court.
#[derive(Debug, Clone)]
pub struct SlotAvailabilityEngine {
    rules: BookingRules,
}

impl SlotAvailabilityEngine {
    pub fn new(rules: BookingRules) -> Self {
        Self { rules }
    }

    /// Dates whose active reservations decide a booking on `date`.
    pub fn lookup_dates(date: NaiveDate) -> [NaiveDate; 3] {
        [add_days(date, -1), date, add_days(date, 1)]
    }

    /// Partition `dates × slots` into free and occupied cells, in calendar order.
    pub fn compute_availability(
        &self,
        dates: &[NaiveDate],
        reservations: &[ReservationRecord],
    ) -> Vec<CourtDay> {
        dates
            .iter()
            .map(|&date| {
                let slots = Slot::ALL
                    .into_iter()
                    .map(|slot| SlotAvailability {
                        slot,
                        end: slot.end_label(),
                        occupied_by: active_of(ResourceKind::Court, reservations)
                            .find(|record| record.date == date && record.slot == Some(slot))
                            .map(OccupantSummary::from),
                    })
                    .collect();
                court_day(date, slots)
            })
            .collect()
    }

    /// Advisory pre-check; the store's uniqueness constraint has the final word.
    ///
    /// Rules run in a fixed order: booking window, own booking the day before, own booking
    /// the same day, own booking the day after, then the slot itself.
    pub fn validate_booking(
        &self,
        candidate: &CourtCandidate,
        existing: &[ReservationRecord],
        today: NaiveDate,
    ) -> Result<(), BookingRejection> {
        let latest = add_days(today, self.rules.court_window_days);
        if candidate.date < today || candidate.date > latest {
            return Err(BookingRejection::OutsideCourtWindow {
                window_days: self.rules.court_window_days,
            });
        }

        // Court rows always carry a slot; anything else is ignored.
        let own: Vec<(&ReservationRecord, Slot)> = active_of(ResourceKind::Court, existing)
            .filter(|record| record.dwelling() == candidate.dwelling)
            .filter_map(|record| record.slot.map(|slot| (record, slot)))
            .collect();
        let own_on = |date: NaiveDate| {
            own.iter()
                .find(|(record, _)| record.date == date)
                .map(|(_, slot)| *slot)
        };

        let previous = add_days(candidate.date, -1);
        if let Some(slot) = own_on(previous) {
            return Err(BookingRejection::PreviousDayBooked {
                date: previous,
                slot,
            });
        }

        if let Some(slot) = own_on(candidate.date) {
            return Err(BookingRejection::SameDayBooked { slot });
        }

        let next = add_days(candidate.date, 1);
        if let Some(slot) = own_on(next) {
            return Err(BookingRejection::NextDayBooked { date: next, slot });
        }

        let taken = active_of(ResourceKind::Court, existing)
            .any(|record| record.date == candidate.date && record.slot == Some(candidate.slot));
        if taken {
            return Err(BookingRejection::SlotTaken);
        }

        Ok(())
    }
}
