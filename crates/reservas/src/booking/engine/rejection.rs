use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::super::calendar::{long_date, short_date};
use super::super::domain::Slot;

/// Named rule failures. Own-dwelling conflicts name the existing booking; a stranger's
/// booking is only ever reported generically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookingRejection {
    OutsideCourtWindow { window_days: i64 },
    OutsideRoomWindow { window_days: i64 },
    PreviousDayBooked { date: NaiveDate, slot: Slot },
    SameDayBooked { slot: Slot },
    NextDayBooked { date: NaiveDate, slot: Slot },
    SlotTaken,
    MonthlyQuotaReached { date: NaiveDate },
    DateTaken,
}

impl BookingRejection {
    pub fn summary(&self) -> String {
        match self {
            BookingRejection::OutsideCourtWindow { window_days } => format!(
                "La fecha seleccionada no es válida. Solo puedes reservar desde hoy hasta {window_days} días en adelante."
            ),
            BookingRejection::OutsideRoomWindow { window_days } => format!(
                "La fecha seleccionada no es válida. Solo puedes reservar desde mañana hasta {window_days} días en adelante."
            ),
            BookingRejection::PreviousDayBooked { date, slot } => format!(
                "No puedes hacer la reserva porque ya tienes una reserva el día anterior ({}) a las {}.",
                short_date(*date),
                slot
            ),
            BookingRejection::SameDayBooked { slot } => format!(
                "No puedes hacer la reserva porque ya tienes una reserva hoy a las {slot}."
            ),
            BookingRejection::NextDayBooked { date, slot } => format!(
                "No puedes hacer la reserva porque ya tienes una reserva el día siguiente ({}) a las {}.",
                short_date(*date),
                slot
            ),
            BookingRejection::SlotTaken => {
                "Este horario ya ha sido reservado por otra persona. Por favor, selecciona otro horario."
                    .to_string()
            }
            BookingRejection::MonthlyQuotaReached { date } => format!(
                "Ya tienes una reserva este mes ({}). Solo se permite una reserva al mes por vivienda.",
                long_date(*date)
            ),
            BookingRejection::DateTaken => {
                "Este día ya ha sido reservado por otro vecino. Por favor, selecciona otra fecha."
                    .to_string()
            }
        }
    }

    /// Stable machine-readable code for API clients.
    pub const fn code(&self) -> &'static str {
        match self {
            BookingRejection::OutsideCourtWindow { .. }
            | BookingRejection::OutsideRoomWindow { .. } => "outside_window",
            BookingRejection::PreviousDayBooked { .. } => "previous_day_booked",
            BookingRejection::SameDayBooked { .. } => "same_day_booked",
            BookingRejection::NextDayBooked { .. } => "next_day_booked",
            BookingRejection::SlotTaken => "slot_taken",
            BookingRejection::MonthlyQuotaReached { .. } => "monthly_quota_reached",
            BookingRejection::DateTaken => "date_taken",
        }
    }
}

impl fmt::Display for BookingRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}

impl std::error::Error for BookingRejection {}
