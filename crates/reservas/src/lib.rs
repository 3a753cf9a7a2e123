//! Booking rules for the community padel court and the community room.
//!
//! Reservation records live in an external store and confirmation e-mails go through an
//! external mailer; this crate decides which bookings are legal, computes calendar
//! availability, and resolves cancellation codes.

pub mod booking;
pub mod config;
pub mod error;
pub mod telemetry;
