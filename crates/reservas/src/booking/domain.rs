use std::fmt;

use chrono::NaiveDate;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::calendar::{self, ROOM_HOURS};

/// Which shared facility a reservation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Court,
    CommunityRoom,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 2] = [ResourceKind::Court, ResourceKind::CommunityRoom];

    /// Collection name in the external store.
    pub const fn collection(self) -> &'static str {
        match self {
            ResourceKind::Court => "reservas",
            ResourceKind::CommunityRoom => "reservas_local",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            ResourceKind::Court => "Pista de Pádel",
            ResourceKind::CommunityRoom => "Local Comunitario",
        }
    }
}

/// Store-assigned identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ReservationId(pub String);

/// Bearer token granting the right to cancel one reservation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CancellationCode(pub String);

const CODE_LENGTH: usize = 26;
const CODE_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

impl CancellationCode {
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let code = (0..CODE_LENGTH)
            .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
            .collect();
        Self(code)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// The six fixed 90-minute court slots, identified by their start label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Slot {
    #[serde(rename = "10:00")]
    T1000,
    #[serde(rename = "11:30")]
    T1130,
    #[serde(rename = "13:00")]
    T1300,
    #[serde(rename = "17:00")]
    T1700,
    #[serde(rename = "18:30")]
    T1830,
    #[serde(rename = "20:00")]
    T2000,
}

impl Slot {
    pub const ALL: [Slot; 6] = [
        Slot::T1000,
        Slot::T1130,
        Slot::T1300,
        Slot::T1700,
        Slot::T1830,
        Slot::T2000,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Slot::T1000 => "10:00",
            Slot::T1130 => "11:30",
            Slot::T1300 => "13:00",
            Slot::T1700 => "17:00",
            Slot::T1830 => "18:30",
            Slot::T2000 => "20:00",
        }
    }

    /// Fixed lookup; the court is closed between 14:30 and 17:00.
    pub const fn end_label(self) -> &'static str {
        match self {
            Slot::T1000 => "11:30",
            Slot::T1130 => "13:00",
            Slot::T1300 => "14:30",
            Slot::T1700 => "18:30",
            Slot::T1830 => "20:00",
            Slot::T2000 => "21:30",
        }
    }

    pub fn from_label(label: &str) -> Option<Slot> {
        Slot::ALL.into_iter().find(|slot| slot.label() == label)
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Portal number of one of the community's buildings (4 through 8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Building(u8);

impl Building {
    pub const NUMBERS: [u8; 5] = [4, 5, 6, 7, 8];

    pub fn new(number: u8) -> Option<Self> {
        Self::NUMBERS.contains(&number).then_some(Self(number))
    }

    pub const fn number(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Building {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Building::new(value).ok_or_else(|| format!("portal {value} does not exist"))
    }
}

impl From<Building> for u8 {
    fn from(value: Building) -> Self {
        value.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Floor {
    #[serde(rename = "Bajo")]
    Ground,
    #[serde(rename = "1")]
    First,
    #[serde(rename = "2")]
    Second,
    #[serde(rename = "3")]
    Third,
    #[serde(rename = "4")]
    Fourth,
    #[serde(rename = "5")]
    Fifth,
    #[serde(rename = "Ático")]
    Penthouse,
}

impl Floor {
    pub const ALL: [Floor; 7] = [
        Floor::Ground,
        Floor::First,
        Floor::Second,
        Floor::Third,
        Floor::Fourth,
        Floor::Fifth,
        Floor::Penthouse,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Floor::Ground => "Bajo",
            Floor::First => "1",
            Floor::Second => "2",
            Floor::Third => "3",
            Floor::Fourth => "4",
            Floor::Fifth => "5",
            Floor::Penthouse => "Ático",
        }
    }

    pub fn from_label(label: &str) -> Option<Floor> {
        Floor::ALL.into_iter().find(|floor| floor.label() == label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Unit {
    A,
    B,
    C,
    D,
    E,
    F,
}

impl Unit {
    pub const ALL: [Unit; 6] = [Unit::A, Unit::B, Unit::C, Unit::D, Unit::E, Unit::F];

    pub const fn letter(self) -> char {
        match self {
            Unit::A => 'A',
            Unit::B => 'B',
            Unit::C => 'C',
            Unit::D => 'D',
            Unit::E => 'E',
            Unit::F => 'F',
        }
    }

    /// Case-insensitive; residents often type the letter in lowercase.
    pub fn from_letter(letter: &str) -> Option<Unit> {
        let mut chars = letter.chars();
        let first = chars.next()?.to_ascii_uppercase();
        if chars.next().is_some() {
            return None;
        }
        Unit::ALL.into_iter().find(|unit| unit.letter() == first)
    }
}

/// A housing unit: the entity booking quotas are enforced against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Dwelling {
    pub building: Building,
    pub floor: Floor,
    pub unit: Unit,
}

impl fmt::Display for Dwelling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Portal {} - {}{}",
            self.building.number(),
            self.floor.label(),
            self.unit.letter()
        )
    }
}

/// Contact details of the resident making a booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occupant {
    pub first_name: String,
    pub last_name: String,
    #[serde(flatten)]
    pub dwelling: Dwelling,
    pub phone: String,
    pub email: String,
}

impl Occupant {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    Active,
    Cancelled,
}

impl ReservationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ReservationStatus::Active => "activa",
            ReservationStatus::Cancelled => "cancelada",
        }
    }
}

/// A reservation as persisted by the external store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationRecord {
    pub id: ReservationId,
    pub kind: ResourceKind,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot: Option<Slot>,
    pub occupant: Occupant,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub cancellation_code: CancellationCode,
    pub status: ReservationStatus,
}

impl ReservationRecord {
    pub fn from_new(id: ReservationId, reservation: NewReservation) -> Self {
        Self {
            id,
            kind: reservation.kind,
            date: reservation.date,
            slot: reservation.slot,
            occupant: reservation.occupant,
            reason: reservation.reason,
            cancellation_code: reservation.cancellation_code,
            status: reservation.status,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == ReservationStatus::Active
    }

    pub fn dwelling(&self) -> Dwelling {
        self.occupant.dwelling
    }

    /// `10:00 - 11:30` for court slots, the fixed opening hours for the room.
    pub fn time_range(&self) -> String {
        match self.slot {
            Some(slot) => format!("{} - {}", slot.label(), slot.end_label()),
            None => ROOM_HOURS.to_string(),
        }
    }

    /// Public projection without contact details or the cancellation code.
    pub fn view(&self) -> ReservationView {
        ReservationView {
            id: self.id.clone(),
            kind: self.kind,
            date: self.date,
            weekday: calendar::weekday_name(self.date),
            time_range: self.time_range(),
            occupant_name: self.occupant.full_name(),
            dwelling: self.dwelling().to_string(),
            reason: self.reason.clone(),
            status: self.status.label(),
        }
    }
}

/// Insert payload; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewReservation {
    pub kind: ResourceKind,
    pub date: NaiveDate,
    pub slot: Option<Slot>,
    pub occupant: Occupant,
    pub reason: Option<String>,
    pub cancellation_code: CancellationCode,
    pub status: ReservationStatus,
}

/// Raw booking form as submitted by a resident.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingSubmission {
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub slot: Option<String>,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub building: Option<u8>,
    #[serde(default)]
    pub floor: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub reason: Option<String>,
}

/// What is being booked, after intake validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingTarget {
    Court { date: NaiveDate, slot: Slot },
    CommunityRoom { date: NaiveDate, reason: String },
}

impl BookingTarget {
    pub fn kind(&self) -> ResourceKind {
        match self {
            BookingTarget::Court { .. } => ResourceKind::Court,
            BookingTarget::CommunityRoom { .. } => ResourceKind::CommunityRoom,
        }
    }

    pub fn date(&self) -> NaiveDate {
        match self {
            BookingTarget::Court { date, .. } | BookingTarget::CommunityRoom { date, .. } => *date,
        }
    }
}

/// A validated booking candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingRequest {
    pub target: BookingTarget,
    pub occupant: Occupant,
}

impl BookingRequest {
    pub fn into_new_reservation(self, cancellation_code: CancellationCode) -> NewReservation {
        let (kind, date, slot, reason) = match self.target {
            BookingTarget::Court { date, slot } => (ResourceKind::Court, date, Some(slot), None),
            BookingTarget::CommunityRoom { date, reason } => {
                (ResourceKind::CommunityRoom, date, None, Some(reason))
            }
        };
        NewReservation {
            kind,
            date,
            slot,
            occupant: self.occupant,
            reason,
            cancellation_code,
            status: ReservationStatus::Active,
        }
    }
}

/// Sanitized reservation shown in calendars and history listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReservationView {
    pub id: ReservationId,
    pub kind: ResourceKind,
    pub date: NaiveDate,
    pub weekday: &'static str,
    pub time_range: String,
    pub occupant_name: String,
    pub dwelling: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub status: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancellation_codes_are_long_and_distinct() {
        let first = CancellationCode::generate();
        let second = CancellationCode::generate();
        assert_eq!(first.as_str().len(), 26);
        assert!(first
            .as_str()
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
        assert_ne!(first, second);
    }

    #[test]
    fn slot_labels_round_trip_through_lookup() {
        for slot in Slot::ALL {
            assert_eq!(Slot::from_label(slot.label()), Some(slot));
        }
        assert_eq!(Slot::from_label("14:30"), None);
    }

    #[test]
    fn building_rejects_unknown_portals() {
        assert!(Building::new(3).is_none());
        assert!(Building::new(9).is_none());
        assert_eq!(Building::new(6).map(Building::number), Some(6));
    }

    #[test]
    fn unit_letter_is_case_insensitive() {
        assert_eq!(Unit::from_letter("b"), Some(Unit::B));
        assert_eq!(Unit::from_letter("G"), None);
        assert_eq!(Unit::from_letter("AB"), None);
        assert_eq!(Unit::from_letter(""), None);
    }

    #[test]
    fn dwelling_serializes_with_spanish_floor_labels() {
        let dwelling = Dwelling {
            building: Building::new(5).expect("portal"),
            floor: Floor::Penthouse,
            unit: Unit::C,
        };
        let json = serde_json::to_value(dwelling).expect("serializes");
        assert_eq!(json["building"], 5);
        assert_eq!(json["floor"], "Ático");
        assert_eq!(json["unit"], "C");
        assert_eq!(dwelling.to_string(), "Portal 5 - ÁticoC");
    }
}
