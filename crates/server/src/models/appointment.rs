//! Grooming and boarding appointments.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use pawtopia_core::{AppointmentId, AppointmentStatus, Email, PetService, Price, UserId};

use super::{ValidationError, required};

/// A booked appointment.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    #[serde(rename = "appointmentId")]
    pub id: AppointmentId,
    pub user_id: UserId,
    pub date: NaiveDate,
    #[serde(with = "hh_mm")]
    pub time: NaiveTime,
    pub email: Email,
    pub contact_no: String,
    #[serde(rename = "groomService")]
    pub service: PetService,
    pub price: Price,
    pub canceled: bool,
    pub confirmed: bool,
    pub created_at: DateTime<Utc>,
}

impl Appointment {
    #[must_use]
    pub const fn status(&self) -> AppointmentStatus {
        AppointmentStatus::from_flags(self.canceled, self.confirmed)
    }
}

/// An appointment with its derived status, as returned to clients.
#[derive(Debug, Clone, Serialize)]
pub struct AppointmentView {
    #[serde(flatten)]
    pub appointment: Appointment,
    pub status: AppointmentStatus,
}

impl From<Appointment> for AppointmentView {
    fn from(appointment: Appointment) -> Self {
        Self {
            status: appointment.status(),
            appointment,
        }
    }
}

/// A booking request. The price is derived from the service.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentInput {
    pub date: NaiveDate,
    #[serde(with = "hh_mm")]
    pub time: NaiveTime,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub contact_no: String,
    pub groom_service: PetService,
}

/// Booking fields after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidAppointment {
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub email: Email,
    pub contact_no: String,
    pub service: PetService,
    pub price: Price,
}

impl AppointmentInput {
    /// # Errors
    ///
    /// Returns an error for a past date, a malformed email, or a bad contact number.
    pub fn validate(&self, today: NaiveDate) -> Result<ValidAppointment, ValidationError> {
        Ok(ValidAppointment {
            date: validate_date(self.date, today)?,
            time: self.time,
            email: parse_email(&self.email)?,
            contact_no: validate_contact_no(&self.contact_no)?,
            service: self.groom_service,
            price: self.groom_service.price(),
        })
    }
}

/// Customer edit of a booking. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentUpdate {
    pub date: Option<NaiveDate>,
    #[serde(default, with = "hh_mm::option")]
    pub time: Option<NaiveTime>,
    pub email: Option<String>,
    pub contact_no: Option<String>,
}

/// Appointment edit after validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidAppointmentUpdate {
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub email: Option<Email>,
    pub contact_no: Option<String>,
}

impl AppointmentUpdate {
    /// # Errors
    ///
    /// Returns an error for a past date, a malformed email, or a bad contact number.
    pub fn validate(&self, today: NaiveDate) -> Result<ValidAppointmentUpdate, ValidationError> {
        Ok(ValidAppointmentUpdate {
            date: self.date.map(|d| validate_date(d, today)).transpose()?,
            time: self.time,
            email: self.email.as_deref().map(parse_email).transpose()?,
            contact_no: self
                .contact_no
                .as_deref()
                .map(validate_contact_no)
                .transpose()?,
        })
    }
}

fn validate_date(date: NaiveDate, today: NaiveDate) -> Result<NaiveDate, ValidationError> {
    if date < today {
        return Err(ValidationError::invalid("date", "cannot be in the past"));
    }
    Ok(date)
}

fn parse_email(email: &str) -> Result<Email, ValidationError> {
    Email::parse(email).map_err(|e| ValidationError::invalid("email", e.to_string()))
}

/// Digits with optional `+`, spaces, and dashes; 7 to 15 digits.
fn validate_contact_no(contact_no: &str) -> Result<String, ValidationError> {
    let contact_no = required("contactNo", contact_no)?;
    let allowed = contact_no
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | ' ' | '-'));
    let digits = contact_no.chars().filter(char::is_ascii_digit).count();
    if !allowed || !(7..=15).contains(&digits) {
        return Err(ValidationError::invalid(
            "contactNo",
            "must be a phone number with 7 to 15 digits",
        ));
    }
    Ok(contact_no)
}

/// `HH:MM` time format used by the booking forms. Seconds are accepted on input.
mod hh_mm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&time.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(serde::de::Error::custom)
    }

    pub(super) fn parse(raw: &str) -> Result<NaiveTime, chrono::ParseError> {
        let raw = raw.trim();
        NaiveTime::parse_from_str(raw, FORMAT)
            .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
    }

    pub mod option {
        use chrono::NaiveTime;
        use serde::{Deserialize, Deserializer};

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<NaiveTime>, D::Error> {
            Option::<String>::deserialize(deserializer)?
                .map(|raw| super::parse(&raw).map_err(serde::de::Error::custom))
                .transpose()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 10).unwrap()
    }

    fn input(date: &str) -> AppointmentInput {
        serde_json::from_str(&format!(
            r#"{{"date":"{date}","time":"14:30","email":"owner@pawtopia.ph",
                "contactNo":"+63 917-123-4567","groomService":"Grooming"}}"#
        ))
        .unwrap()
    }

    #[test]
    fn test_price_comes_from_service() {
        let valid = input("2026-03-12").validate(today()).unwrap();
        assert_eq!(valid.price, Price::from_pesos(500));
        assert_eq!(valid.time, NaiveTime::from_hms_opt(14, 30, 0).unwrap());
    }

    #[test]
    fn test_same_day_allowed_past_rejected() {
        assert!(input("2026-03-10").validate(today()).is_ok());
        assert!(matches!(
            input("2026-03-09").validate(today()),
            Err(ValidationError::Invalid { field: "date", .. })
        ));
    }

    #[test]
    fn test_contact_number_rules() {
        assert!(validate_contact_no("09171234567").is_ok());
        assert!(validate_contact_no("12345").is_err());
        assert!(validate_contact_no("0917-CALL-ME").is_err());
        assert_eq!(
            validate_contact_no(""),
            Err(ValidationError::Required("contactNo"))
        );
    }

    #[test]
    fn test_update_is_partial() {
        let update: AppointmentUpdate =
            serde_json::from_str(r#"{"contactNo":"09998887777"}"#).unwrap();
        let valid = update.validate(today()).unwrap();
        assert_eq!(valid.contact_no.as_deref(), Some("09998887777"));
        assert_eq!(valid.date, None);
        assert_eq!(valid.time, None);
    }

    #[test]
    fn test_time_accepts_seconds() {
        let update: AppointmentUpdate = serde_json::from_str(r#"{"time":"09:05:00"}"#).unwrap();
        assert_eq!(update.time, NaiveTime::from_hms_opt(9, 5, 0));
    }

    #[test]
    fn test_view_includes_status() {
        let view = AppointmentView::from(Appointment {
            id: AppointmentId::new(1),
            user_id: UserId::new(2),
            date: today(),
            time: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            email: Email::parse("owner@pawtopia.ph").unwrap(),
            contact_no: "09171234567".into(),
            service: PetService::Boarding,
            price: PetService::Boarding.price(),
            canceled: true,
            confirmed: true,
            created_at: Utc::now(),
        });
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["status"], "CANCELED");
        assert_eq!(json["time"], "08:00");
        assert_eq!(json["groomService"], "BOARDING");
        assert_eq!(json["appointmentId"], 1);
    }
}
