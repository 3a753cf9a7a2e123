use super::domain::{
    BookingRequest, BookingSubmission, BookingTarget, Building, Dwelling, Floor, Occupant,
    ResourceKind, Slot, Unit,
};

/// Form-level problems found before any booking rule runs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntakeViolation {
    #[error("Todos los campos son obligatorios (falta: {0})")]
    MissingField(&'static str),
    #[error("El portal {0} no existe")]
    InvalidBuilding(u8),
    #[error("El piso '{0}' no es válido")]
    InvalidFloor(String),
    #[error("La letra '{0}' no es válida")]
    InvalidUnit(String),
    #[error("El correo electrónico no es válido")]
    InvalidEmail,
    #[error("El teléfono móvil debe tener al menos 9 dígitos")]
    InvalidPhone,
    #[error("El horario '{0}' no existe")]
    InvalidSlot(String),
}

const MIN_PHONE_DIGITS: usize = 9;

/// Turns raw submissions into validated [`BookingRequest`]s.
#[derive(Debug, Clone, Default)]
pub struct IntakeGuard;

impl IntakeGuard {
    pub fn request_from_submission(
        &self,
        kind: ResourceKind,
        submission: BookingSubmission,
    ) -> Result<BookingRequest, IntakeViolation> {
        let first_name = required("first_name", &submission.first_name)?;
        let last_name = required("last_name", &submission.last_name)?;
        let building_number = submission
            .building
            .ok_or(IntakeViolation::MissingField("building"))?;
        let floor_label = required("floor", &submission.floor)?;
        let unit_label = required("unit", &submission.unit)?;
        let phone = required("phone", &submission.phone)?;
        let email = required("email", &submission.email)?;
        let date = submission
            .date
            .ok_or(IntakeViolation::MissingField("date"))?;

        let target = match kind {
            ResourceKind::Court => {
                let label = submission
                    .slot
                    .as_deref()
                    .map(str::trim)
                    .filter(|label| !label.is_empty())
                    .ok_or(IntakeViolation::MissingField("slot"))?;
                let slot = Slot::from_label(label)
                    .ok_or_else(|| IntakeViolation::InvalidSlot(label.to_string()))?;
                BookingTarget::Court { date, slot }
            }
            ResourceKind::CommunityRoom => {
                let reason = required("reason", submission.reason.as_deref().unwrap_or_default())?;
                BookingTarget::CommunityRoom { date, reason }
            }
        };

        let building = Building::new(building_number)
            .ok_or(IntakeViolation::InvalidBuilding(building_number))?;
        let floor = Floor::from_label(&floor_label)
            .ok_or_else(|| IntakeViolation::InvalidFloor(floor_label.clone()))?;
        let unit = Unit::from_letter(&unit_label)
            .ok_or_else(|| IntakeViolation::InvalidUnit(unit_label.clone()))?;

        if !is_plausible_email(&email) {
            return Err(IntakeViolation::InvalidEmail);
        }
        if phone.len() < MIN_PHONE_DIGITS || !phone.chars().all(|c| c.is_ascii_digit()) {
            return Err(IntakeViolation::InvalidPhone);
        }

        Ok(BookingRequest {
            target,
            occupant: Occupant {
                first_name,
                last_name,
                dwelling: Dwelling {
                    building,
                    floor,
                    unit,
                },
                phone,
                email,
            },
        })
    }
}

fn required(field: &'static str, value: &str) -> Result<String, IntakeViolation> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(IntakeViolation::MissingField(field))
    } else {
        Ok(trimmed.to_string())
    }
}

/// `local@domain.tld` with no whitespace and exactly one `@`.
fn is_plausible_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}
