//! Appointment booking wizard: reason → doctor/date/time → confirmation → submit.
//!
//! Each step consumes the previous one, so the carried-forward parameters are
//! always complete and a step cannot be skipped. Nothing is persisted between
//! steps. `BookingMode` decides whether submission creates a new appointment
//! or reschedules an existing one.

use serde::Serialize;

use crate::api::Transport;
use crate::credentials::CredentialStore;
use crate::error::ClientError;
use crate::format;
use crate::models::{Appointment, DoctorProfile, NewAppointment, RescheduleAppointment};
use crate::session::Session;

pub const MAX_REASON_CHARS: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingMode {
    New,
    Reschedule { appointment_id: String },
}

/// How the time was entered; both forms normalize to `HH:MM`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeInput {
    Picker { hour: u32, minute: u32 },
    Text(String),
}

impl TimeInput {
    pub fn normalize(&self) -> Result<String, ClientError> {
        let normalized = match self {
            Self::Picker { hour, minute } => format::time_from_picker(*hour, *minute),
            Self::Text(raw) => format::normalize_time(raw),
        };
        normalized.map_err(|e| ClientError::Validation(e.to_string()))
    }
}

/// The doctor chosen in step two.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoctorChoice {
    pub id: String,
    pub name: String,
}

impl From<&DoctorProfile> for DoctorChoice {
    fn from(doctor: &DoctorProfile) -> Self {
        Self {
            id: doctor.id.clone(),
            name: doctor.name.clone(),
        }
    }
}

/// Load the doctors offered in step two.
pub fn available_doctors<S: CredentialStore, T: Transport>(
    session: &Session<S, T>,
) -> Result<Vec<DoctorProfile>, ClientError> {
    let token = session.token()?;
    Ok(session.api().doctors(&token)?)
}

// ═══════════════════════════════════════════════════════════
// Steps
// ═══════════════════════════════════════════════════════════

/// Step 1: capture the reason for the visit.
#[derive(Debug, Clone)]
pub struct ReasonStep {
    mode: BookingMode,
}

impl ReasonStep {
    pub fn new(mode: BookingMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> &BookingMode {
        &self.mode
    }

    pub fn reason(self, reason: &str) -> Result<ScheduleStep, ClientError> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(ClientError::Validation("Please describe the reason for your visit".into()));
        }
        if reason.chars().count() > MAX_REASON_CHARS {
            return Err(ClientError::Validation(format!(
                "Reason too long (max {MAX_REASON_CHARS} chars)"
            )));
        }
        Ok(ScheduleStep {
            mode: self.mode,
            reason: reason.to_string(),
        })
    }
}

/// Step 2: pick doctor, date and time.
#[derive(Debug, Clone)]
pub struct ScheduleStep {
    mode: BookingMode,
    reason: String,
}

impl ScheduleStep {
    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn choose(
        self,
        doctor: DoctorChoice,
        date: &str,
        time: &TimeInput,
    ) -> Result<ConfirmStep, ClientError> {
        if doctor.id.trim().is_empty() {
            return Err(ClientError::Validation("Please select a doctor".into()));
        }
        let date = format::normalize_date(date).map_err(|e| ClientError::Validation(e.to_string()))?;
        let time = time.normalize()?;
        Ok(ConfirmStep {
            mode: self.mode,
            reason: self.reason,
            doctor,
            date,
            time,
        })
    }
}

/// What the confirmation screen shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingSummary {
    pub doctor_name: String,
    pub date_label: String,
    pub time_label: String,
    pub reason: String,
    pub rescheduling: bool,
}

/// Step 3: review, then submit.
#[derive(Debug, Clone)]
pub struct ConfirmStep {
    mode: BookingMode,
    reason: String,
    doctor: DoctorChoice,
    /// `YYYY-MM-DD`
    date: String,
    /// `HH:MM`
    time: String,
}

/// What submission did.
#[derive(Debug, Clone, PartialEq)]
pub enum BookingResult {
    Created(Appointment),
    Rescheduled { appointment_id: String },
}

impl ConfirmStep {
    pub fn summary(&self) -> BookingSummary {
        BookingSummary {
            doctor_name: self.doctor.name.clone(),
            date_label: format::format_date(&self.date),
            time_label: format::format_time(&self.time),
            reason: self.reason.clone(),
            rescheduling: matches!(self.mode, BookingMode::Reschedule { .. }),
        }
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn time(&self) -> &str {
        &self.time
    }

    /// Step 4: create or reschedule through the backend.
    pub fn submit<S: CredentialStore, T: Transport>(
        self,
        session: &Session<S, T>,
    ) -> Result<BookingResult, ClientError> {
        let token = session.token()?;
        match self.mode {
            BookingMode::New => {
                let body = NewAppointment {
                    doctor: self.doctor.id,
                    date: self.date,
                    time: self.time,
                    reason: self.reason,
                };
                let appointment = session.api().create_appointment(&token, &body)?;
                tracing::info!(appointment_id = %appointment.id, date = %body.date, time = %body.time, "Appointment booked");
                Ok(BookingResult::Created(appointment))
            }
            BookingMode::Reschedule { appointment_id } => {
                let body = RescheduleAppointment {
                    doctor: self.doctor.id,
                    date: self.date,
                    time: self.time,
                };
                session.api().reschedule(&token, &appointment_id, &body)?;
                tracing::info!(%appointment_id, date = %body.date, time = %body.time, "Appointment rescheduled");
                Ok(BookingResult::Rescheduled { appointment_id })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::Method;
    use serde_json::json;

    use crate::api::transport::RecordingTransport;
    use crate::api::ApiClient;
    use crate::credentials::{self, BearerToken, MemoryCredentialStore};

    fn signed_in(transport: RecordingTransport) -> Session<MemoryCredentialStore, RecordingTransport> {
        let session = Session::new(MemoryCredentialStore::new(), ApiClient::new(transport));
        credentials::save_token(session.store(), &BearerToken::new("tok").unwrap()).unwrap();
        session
    }

    fn doctor() -> DoctorChoice {
        DoctorChoice {
            id: "d1".into(),
            name: "Dr. Osei".into(),
        }
    }

    fn confirm(mode: BookingMode) -> ConfirmStep {
        ReasonStep::new(mode)
            .reason("  Persistent cough ")
            .unwrap()
            .choose(doctor(), "2024-1-5", &TimeInput::Text("9:5".into()))
            .unwrap()
    }

    #[test]
    fn blank_reason_rejected() {
        assert!(ReasonStep::new(BookingMode::New).reason("   ").is_err());
    }

    #[test]
    fn overlong_reason_rejected() {
        let long = "a".repeat(MAX_REASON_CHARS + 1);
        assert!(ReasonStep::new(BookingMode::New).reason(&long).is_err());
    }

    #[test]
    fn schedule_normalizes_date_and_time() {
        let step = confirm(BookingMode::New);
        assert_eq!(step.date(), "2024-01-05");
        assert_eq!(step.time(), "09:05");
    }

    #[test]
    fn picker_and_text_agree() {
        let schedule = ReasonStep::new(BookingMode::New).reason("Rash").unwrap();
        let from_picker = schedule
            .clone()
            .choose(doctor(), "2024-01-05", &TimeInput::Picker { hour: 14, minute: 0 })
            .unwrap();
        let from_text = schedule
            .choose(doctor(), "2024-01-05", &TimeInput::Text("14:00".into()))
            .unwrap();
        assert_eq!(from_picker.time(), from_text.time());
    }

    #[test]
    fn invalid_schedule_rejected() {
        let schedule = ReasonStep::new(BookingMode::New).reason("Rash").unwrap();
        assert!(schedule
            .clone()
            .choose(doctor(), "2024-02-30", &TimeInput::Text("10:00".into()))
            .is_err());
        assert!(schedule
            .clone()
            .choose(doctor(), "2024-02-01", &TimeInput::Picker { hour: 25, minute: 0 })
            .is_err());
        let nobody = DoctorChoice {
            id: " ".into(),
            name: String::new(),
        };
        assert!(schedule
            .choose(nobody, "2024-02-01", &TimeInput::Text("10:00".into()))
            .is_err());
    }

    #[test]
    fn summary_is_formatted() {
        let summary = confirm(BookingMode::New).summary();
        assert_eq!(
            summary,
            BookingSummary {
                doctor_name: "Dr. Osei".into(),
                date_label: "05 Jan 2024".into(),
                time_label: "9:05 am".into(),
                reason: "Persistent cough".into(),
                rescheduling: false,
            }
        );
    }

    #[test]
    fn new_booking_posts_appointment() {
        let session = signed_in(RecordingTransport::new().reply(
            Method::POST,
            "/api/appointments",
            json!({
                "_id": "a9", "doctor": "d1", "patient": "p1",
                "date": "2024-01-05", "time": "09:05",
                "status": "PENDING", "reason": "Persistent cough"
            }),
        ));

        let result = confirm(BookingMode::New).submit(&session).unwrap();
        assert!(matches!(result, BookingResult::Created(ref a) if a.id == "a9"));

        let calls = session.api().transport().calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].method, Method::POST);
        assert_eq!(
            calls[0].body,
            Some(json!({
                "doctor": "d1",
                "date": "2024-01-05",
                "time": "09:05",
                "reason": "Persistent cough"
            }))
        );
    }

    #[test]
    fn reschedule_puts_to_existing_appointment() {
        let session = signed_in(RecordingTransport::new().reply(
            Method::PUT,
            "/api/appointments/reschedule/a1",
            json!({"message": "Rescheduled"}),
        ));

        let mode = BookingMode::Reschedule {
            appointment_id: "a1".into(),
        };
        let result = confirm(mode).submit(&session).unwrap();
        assert_eq!(
            result,
            BookingResult::Rescheduled {
                appointment_id: "a1".into()
            }
        );
        assert_eq!(
            session.api().transport().routes(),
            vec![(Method::PUT, "/api/appointments/reschedule/a1".to_string())]
        );
    }

    #[test]
    fn submit_without_token_sends_nothing() {
        let session = Session::new(
            MemoryCredentialStore::new(),
            ApiClient::new(RecordingTransport::new()),
        );
        let err = confirm(BookingMode::New).submit(&session).unwrap_err();
        assert!(matches!(err, ClientError::NotAuthenticated));
        assert_eq!(session.api().transport().call_count(), 0);
    }

    #[test]
    fn doctors_listing_feeds_choice() {
        let session = signed_in(RecordingTransport::new().reply(
            Method::GET,
            "/api/doctors",
            json!([{"_id": "d1", "name": "Dr. Osei", "specialization": "General Practice"}]),
        ));
        let doctors = available_doctors(&session).unwrap();
        let choice = DoctorChoice::from(&doctors[0]);
        assert_eq!(choice, doctor());
    }
}
