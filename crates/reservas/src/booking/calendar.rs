//! Date helpers shared by both engines and the presentation layer.
//!
//! Dates are plain calendar days (`NaiveDate`); there is no time of day to drift across a
//! midnight boundary, so "today" is whatever local date the caller passes in.

use chrono::{Datelike, Days, NaiveDate};

use super::domain::Slot;

/// Opening hours of the community room; informational only.
pub const ROOM_HOURS: &str = "10:00 - 22:00";

const WEEKDAYS: [&str; 7] = [
    "Domingo",
    "Lunes",
    "Martes",
    "Miércoles",
    "Jueves",
    "Viernes",
    "Sábado",
];

const MONTHS: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

pub fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

/// Parse a `YYYY-MM` month reference into `(year, month)`.
pub fn parse_month(raw: &str) -> Result<(i32, u32), String> {
    let first = NaiveDate::parse_from_str(&format!("{}-01", raw.trim()), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM ({err})"))?;
    Ok((first.year(), first.month()))
}

/// End label for a slot start label, `None` for anything that is not one of the six slots.
pub fn end_time(start_label: &str) -> Option<&'static str> {
    Slot::from_label(start_label).map(Slot::end_label)
}

pub fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
    let magnitude = Days::new(days.unsigned_abs());
    let shifted = if days >= 0 {
        date.checked_add_days(magnitude)
    } else {
        date.checked_sub_days(magnitude)
    };
    shifted.unwrap_or(date)
}

/// `days` consecutive dates starting at `start`.
pub fn date_window(start: NaiveDate, days: u32) -> Vec<NaiveDate> {
    start.iter_days().take(days as usize).collect()
}

/// Every date in the inclusive range `[from, to]`.
pub fn dates_between(from: NaiveDate, to: NaiveDate) -> Vec<NaiveDate> {
    from.iter_days().take_while(|date| *date <= to).collect()
}

/// Court dates a resident may book: today through `today + window_days`, both inclusive.
pub fn court_booking_dates(today: NaiveDate, window_days: i64) -> Vec<NaiveDate> {
    dates_between(today, add_days(today, window_days))
}

/// Room dates on offer: tomorrow through `today + window_days`. Today is never offered.
pub fn room_candidate_dates(today: NaiveDate, window_days: i64) -> Vec<NaiveDate> {
    dates_between(add_days(today, 1), add_days(today, window_days))
}

pub fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((first, next.pred_opt()?))
}

pub fn same_month(a: NaiveDate, b: NaiveDate) -> bool {
    a.year() == b.year() && a.month() == b.month()
}

/// History navigation stops at the month containing `today`.
pub fn can_go_next(year: i32, month: u32, today: NaiveDate) -> bool {
    (year, month) < (today.year(), today.month())
}

pub fn weekday_name(date: NaiveDate) -> &'static str {
    WEEKDAYS[date.weekday().num_days_from_sunday() as usize]
}

/// `11/06/2024`
pub fn short_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// `15 de junio de 2024`
pub fn long_date(date: NaiveDate) -> String {
    format!(
        "{:02} de {} de {}",
        date.day(),
        MONTHS[date.month0() as usize],
        date.year()
    )
}

/// `Junio 2024`
pub fn month_heading(year: i32, month: u32) -> String {
    let name = MONTHS
        .get(month.saturating_sub(1) as usize)
        .copied()
        .unwrap_or_default();
    let mut chars = name.chars();
    let capitalized: String = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    };
    format!("{capitalized} {year}")
}
