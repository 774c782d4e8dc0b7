//! Typed endpoint client for the telehealth backend.
//!
//! Every method takes the bearer token explicitly so the login flow can
//! probe the profile with a token it has not stored yet.

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::error::ApiError;
use super::transport::{ApiRequest, Transport};
use crate::credentials::BearerToken;
use crate::models::{
    self, Appointment, AppointmentStatus, Diagnosis, DiagnosisDraft, DoctorProfile, NewAppointment,
    PatientProfile, RegisterUser, RescheduleAppointment, Role, StatusUpdate, User,
};
use crate::records::ClinicalRecord;

/// Body of a record creation: the draft plus the owning appointment.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateRecord<'a, D: Serialize> {
    appointment_id: &'a str,
    #[serde(flatten)]
    draft: &'a D,
}

pub struct ApiClient<T> {
    transport: T,
}

impl<T: Transport> ApiClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    // ── Users ────────────────────────────────────────────

    /// `GET /api/users/profile`
    pub fn profile(&self, token: &BearerToken) -> Result<User, ApiError> {
        self.get(token, "/api/users/profile".into())
    }

    /// `POST /api/users/register`
    pub fn register(&self, token: &BearerToken, body: &RegisterUser) -> Result<User, ApiError> {
        self.send(Method::POST, token, "/api/users/register".into(), body)
    }

    // ── Doctors & patients ───────────────────────────────

    /// `GET /api/doctors`
    pub fn doctors(&self, token: &BearerToken) -> Result<Vec<DoctorProfile>, ApiError> {
        self.get(token, "/api/doctors".into())
    }

    /// `GET /api/doctors/:id`
    pub fn doctor(&self, token: &BearerToken, id: &str) -> Result<DoctorProfile, ApiError> {
        self.get(token, format!("/api/doctors/{}", segment(id)?))
    }

    /// `GET /api/patients/:id`
    pub fn patient(&self, token: &BearerToken, id: &str) -> Result<PatientProfile, ApiError> {
        self.get(token, format!("/api/patients/{}", segment(id)?))
    }

    // ── Appointments ─────────────────────────────────────

    /// `POST /api/appointments`
    pub fn create_appointment(
        &self,
        token: &BearerToken,
        body: &NewAppointment,
    ) -> Result<Appointment, ApiError> {
        self.send(Method::POST, token, "/api/appointments".into(), body)
    }

    /// `GET /api/appointments/doctor` or `/api/appointments/patient`
    pub fn appointments_for(
        &self,
        token: &BearerToken,
        role: Role,
    ) -> Result<Vec<Appointment>, ApiError> {
        let path = match role {
            Role::Doctor => "/api/appointments/doctor",
            Role::Patient => "/api/appointments/patient",
        };
        self.get(token, path.into())
    }

    /// `GET /api/appointments/:id`
    pub fn appointment(&self, token: &BearerToken, id: &str) -> Result<Appointment, ApiError> {
        self.get(token, format!("/api/appointments/{}", segment(id)?))
    }

    /// `PUT /api/appointments/updateStatus/:id`. The response body is not used.
    pub fn update_status(
        &self,
        token: &BearerToken,
        id: &str,
        status: AppointmentStatus,
    ) -> Result<(), ApiError> {
        let path = format!("/api/appointments/updateStatus/{}", segment(id)?);
        self.send_raw(Method::PUT, token, path, Some(to_body(&StatusUpdate { status })?))?;
        Ok(())
    }

    /// `PUT /api/appointments/reschedule/:id`. The response body is not used.
    pub fn reschedule(
        &self,
        token: &BearerToken,
        id: &str,
        body: &RescheduleAppointment,
    ) -> Result<(), ApiError> {
        let path = format!("/api/appointments/reschedule/{}", segment(id)?);
        self.send_raw(Method::PUT, token, path, Some(to_body(body)?))?;
        Ok(())
    }

    // ── Diagnosis ────────────────────────────────────────

    /// `GET /api/appointments/diagnosis/:id`; `None` when nothing is recorded.
    pub fn diagnosis(
        &self,
        token: &BearerToken,
        appointment_id: &str,
    ) -> Result<Option<Diagnosis>, ApiError> {
        let path = format!("/api/appointments/diagnosis/{}", segment(appointment_id)?);
        self.get_optional(token, path)
    }

    /// `PUT /api/appointments/diagnosis/:id`
    pub fn save_diagnosis(
        &self,
        token: &BearerToken,
        appointment_id: &str,
        draft: &DiagnosisDraft,
    ) -> Result<Diagnosis, ApiError> {
        let path = format!("/api/appointments/diagnosis/{}", segment(appointment_id)?);
        self.send(Method::PUT, token, path, draft)
    }

    // ── Clinical records ─────────────────────────────────

    /// `GET {collection}/appointment/:appointmentId`; `None` when no record exists.
    pub fn record<R: ClinicalRecord>(
        &self,
        token: &BearerToken,
        appointment_id: &str,
    ) -> Result<Option<R>, ApiError> {
        let path = format!("{}/appointment/{}", R::COLLECTION, segment(appointment_id)?);
        self.get_optional(token, path)
    }

    /// `POST {collection}`
    pub fn create_record<R: ClinicalRecord>(
        &self,
        token: &BearerToken,
        appointment_id: &str,
        draft: &R::Draft,
    ) -> Result<R, ApiError> {
        let body = CreateRecord {
            appointment_id: segment(appointment_id)?,
            draft,
        };
        self.send(Method::POST, token, R::COLLECTION.to_string(), &body)
    }

    /// `PUT {collection}/:id`
    pub fn update_record<R: ClinicalRecord>(
        &self,
        token: &BearerToken,
        record_id: &str,
        draft: &R::Draft,
    ) -> Result<R, ApiError> {
        let path = format!("{}/{}", R::COLLECTION, segment(record_id)?);
        self.send(Method::PUT, token, path, draft)
    }

    /// `PUT {collection}/verify/:id`.
    ///
    /// Returns the verified record when the backend echoes it, `None` when it
    /// answers with an empty or message-only body.
    pub fn verify_record<R: ClinicalRecord>(
        &self,
        token: &BearerToken,
        record_id: &str,
    ) -> Result<Option<R>, ApiError> {
        let path = format!("{}/verify/{}", R::COLLECTION, segment(record_id)?);
        match self.send_raw(Method::PUT, token, path.clone(), None)? {
            Value::Null => Ok(None),
            value if is_acknowledgement(&value) => {
                tracing::debug!(endpoint = %path, "Verify answered without a record");
                Ok(None)
            }
            value => decode(&path, value).map(Some),
        }
    }

    // ── Internal ─────────────────────────────────────────

    fn get<R: DeserializeOwned>(&self, token: &BearerToken, path: String) -> Result<R, ApiError> {
        let value = self.send_raw(Method::GET, token, path.clone(), None)?;
        decode(&path, value)
    }

    /// GET where 404 or a `null` body means "nothing there".
    fn get_optional<R: DeserializeOwned>(
        &self,
        token: &BearerToken,
        path: String,
    ) -> Result<Option<R>, ApiError> {
        match self.send_raw(Method::GET, token, path.clone(), None) {
            Ok(Value::Null) | Err(ApiError::NotFound(_)) => Ok(None),
            Ok(value) => decode(&path, value).map(Some),
            Err(e) => Err(e),
        }
    }

    fn send<B: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        method: Method,
        token: &BearerToken,
        path: String,
        body: &B,
    ) -> Result<R, ApiError> {
        let value = self.send_raw(method, token, path.clone(), Some(to_body(body)?))?;
        decode(&path, value)
    }

    fn send_raw(
        &self,
        method: Method,
        token: &BearerToken,
        path: String,
        body: Option<Value>,
    ) -> Result<Value, ApiError> {
        self.transport.send(ApiRequest {
            method,
            path,
            token: Some(token),
            body,
        })
    }
}

/// Validate an id before splicing it into a URL path.
fn segment(id: &str) -> Result<&str, ApiError> {
    let valid = !id.is_empty()
        && id.len() <= 64
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(id)
    } else {
        Err(ApiError::InvalidId(id.to_string()))
    }
}

/// A success body that carries no record: only `message`/`success`/`status` keys.
fn is_acknowledgement(value: &Value) -> bool {
    match value {
        Value::Object(map) => map
            .keys()
            .all(|k| matches!(k.as_str(), "message" | "success" | "status")),
        Value::String(_) | Value::Bool(_) => true,
        _ => false,
    }
}

fn to_body<B: Serialize + ?Sized>(body: &B) -> Result<Value, ApiError> {
    serde_json::to_value(body).map_err(|e| ApiError::HttpClient(format!("Cannot encode body: {e}")))
}

fn decode<R: DeserializeOwned>(endpoint: &str, mut value: Value) -> Result<R, ApiError> {
    models::collapse_duplicate_ids(&mut value);
    serde_json::from_value(value).map_err(|e| {
        tracing::warn!(endpoint, error = %e, "Response failed validation");
        ApiError::Decode {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        }
    })
}
