use serde::{Deserialize, Serialize};

use super::enums::AppointmentStatus;
use super::user::PartyRef;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    #[serde(alias = "_id")]
    pub id: String,
    pub doctor: PartyRef,
    pub patient: PartyRef,
    /// `YYYY-MM-DD`, possibly delivered as a full ISO timestamp.
    pub date: String,
    /// `HH:MM`, 24-hour.
    pub time: String,
    pub status: AppointmentStatus,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub comment: Option<String>,
}

/// Body of `POST /api/appointments`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAppointment {
    pub doctor: String,
    pub date: String,
    pub time: String,
    pub reason: String,
}

/// Body of `PUT /api/appointments/reschedule/:id`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RescheduleAppointment {
    pub doctor: String,
    pub date: String,
    pub time: String,
}

/// Body of `PUT /api/appointments/updateStatus/:id`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StatusUpdate {
    pub status: AppointmentStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_populated_appointment() {
        let json = r#"{
            "_id": "a1",
            "doctor": {"_id": "d1", "name": "Dr. Osei"},
            "patient": "p1",
            "date": "2024-01-05T00:00:00.000Z",
            "time": "09:30",
            "status": "PENDING",
            "reason": "Follow-up"
        }"#;
        let appt: Appointment = serde_json::from_str(json).unwrap();
        assert_eq!(appt.id, "a1");
        assert_eq!(appt.doctor.name(), Some("Dr. Osei"));
        assert_eq!(appt.patient.id(), "p1");
        assert_eq!(appt.status, AppointmentStatus::Pending);
        assert!(appt.comment.is_none());
    }

    #[test]
    fn missing_status_fails_fast() {
        let json = r#"{"_id":"a1","doctor":"d1","patient":"p1","date":"2024-01-05","time":"09:30"}"#;
        assert!(serde_json::from_str::<Appointment>(json).is_err());
    }

    #[test]
    fn status_update_body() {
        let body = serde_json::to_value(StatusUpdate {
            status: AppointmentStatus::Cancelled,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"status": "CANCELLED"}));
    }
}
