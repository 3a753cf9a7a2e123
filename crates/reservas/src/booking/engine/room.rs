use chrono::{Datelike, NaiveDate};

use super::super::calendar::{add_days, month_bounds, same_month, weekday_name};
use super::super::domain::{Dwelling, ReservationRecord, ResourceKind};
use super::{active_of, BookingRejection, BookingRules, OccupantSummary, RoomDay};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoomCandidate {
    pub date: NaiveDate,
    pub dwelling: Dwelling,
}

/// Whole-day occupancy and the monthly quota for the community room.
#[derive(Debug, Clone)]
pub struct DateAvailabilityEngine {
    rules: BookingRules,
}

impl DateAvailabilityEngine {
    pub fn new(rules: BookingRules) -> Self {
        Self { rules }
    }

    /// Inclusive date range whose active reservations decide a booking on `date`: the
    /// whole calendar month, which covers both the quota and the occupancy rule.
    pub fn lookup_range(date: NaiveDate) -> (NaiveDate, NaiveDate) {
        month_bounds(date.year(), date.month()).unwrap_or((date, date))
    }

    /// Inclusive range loaded for the room calendar.
    pub fn calendar_range(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        (today, add_days(today, self.rules.room_fetch_days))
    }

    pub fn compute_availability(
        &self,
        candidate_dates: &[NaiveDate],
        reservations: &[ReservationRecord],
    ) -> Vec<RoomDay> {
        candidate_dates
            .iter()
            .map(|&date| RoomDay {
                date,
                weekday: weekday_name(date),
                occupied_by: active_of(ResourceKind::CommunityRoom, reservations)
                    .find(|record| record.date == date)
                    .map(OccupantSummary::from),
            })
            .collect()
    }

    /// Advisory pre-check: booking window, monthly quota per dwelling, then the date itself.
    pub fn validate_booking(
        &self,
        candidate: &RoomCandidate,
        existing: &[ReservationRecord],
        today: NaiveDate,
    ) -> Result<(), BookingRejection> {
        let latest = add_days(today, self.rules.room_window_days);
        if candidate.date <= today || candidate.date > latest {
            return Err(BookingRejection::OutsideRoomWindow {
                window_days: self.rules.room_window_days,
            });
        }

        let quota_used = active_of(ResourceKind::CommunityRoom, existing).find(|record| {
            record.dwelling() == candidate.dwelling && same_month(record.date, candidate.date)
        });
        if let Some(record) = quota_used {
            return Err(BookingRejection::MonthlyQuotaReached { date: record.date });
        }

        let taken = active_of(ResourceKind::CommunityRoom, existing)
            .any(|record| record.date == candidate.date);
        if taken {
            return Err(BookingRejection::DateTaken);
        }

        Ok(())
    }
}
