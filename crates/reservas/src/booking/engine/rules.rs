use serde::{Deserialize, Serialize};

/// Booking windows, in days relative to "today".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRules {
    /// Court bookings are accepted for today through `today + court_window_days`.
    pub court_window_days: i64,
    /// Room bookings are accepted for tomorrow through `today + room_window_days`.
    pub room_window_days: i64,
    /// Lookahead used when loading the room calendar.
    pub room_fetch_days: i64,
}

impl Default for BookingRules {
    fn default() -> Self {
        Self {
            court_window_days: 7,
            room_window_days: 30,
            room_fetch_days: 62,
        }
    }
}
