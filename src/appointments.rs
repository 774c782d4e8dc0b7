//! Appointment listing, detail and cancellation.

use serde::Serialize;

use crate::api::Transport;
use crate::credentials::CredentialStore;
use crate::error::ClientError;
use crate::format;
use crate::models::{Appointment, AppointmentStatus, PartyRef, Role};
use crate::session::Session;

/// Asks the user to confirm a destructive action.
pub trait ConfirmPrompt {
    fn confirm(&self, message: &str) -> bool;
}

/// Answers every prompt the same way.
#[derive(Debug, Clone, Copy)]
pub struct FixedAnswer(pub bool);

impl ConfirmPrompt for FixedAnswer {
    fn confirm(&self, _message: &str) -> bool {
        self.0
    }
}

/// One line of the appointment list, already formatted for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentRow {
    pub id: String,
    /// The other party: the patient for doctors, the doctor for patients.
    pub counterpart: String,
    pub date_label: String,
    pub time_label: String,
    pub status: AppointmentStatus,
    pub status_label: &'static str,
    pub status_color: &'static str,
    /// Whether offering a cancel action makes sense. The backend decides.
    pub cancellable: bool,
    /// No further status changes will happen.
    pub settled: bool,
}

impl AppointmentRow {
    pub fn new(appointment: &Appointment, viewer: Role) -> Self {
        let other = counterpart_ref(appointment, viewer);
        Self {
            id: appointment.id.clone(),
            counterpart: other.name().unwrap_or(other.id()).to_string(),
            date_label: format::format_date(&appointment.date),
            time_label: format::format_time(&appointment.time),
            status: appointment.status,
            status_label: format::status_label(appointment.status),
            status_color: format::status_color(appointment.status),
            cancellable: appointment.status.is_cancellable(),
            settled: appointment.status.is_terminal(),
        }
    }
}

fn counterpart_ref(appointment: &Appointment, viewer: Role) -> &PartyRef {
    match viewer {
        Role::Doctor => &appointment.patient,
        Role::Patient => &appointment.doctor,
    }
}

/// The other party of an appointment, resolved for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Counterpart {
    pub id: String,
    pub name: String,
    pub role: Role,
    /// Specialization for doctors, email for patients.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppointmentDetail {
    pub appointment: Appointment,
    pub counterpart: Counterpart,
}

/// Appointments of the signed-in user; the endpoint follows the role.
pub fn list<S: CredentialStore, T: Transport>(
    session: &Session<S, T>,
    role: Role,
) -> Result<Vec<Appointment>, ClientError> {
    let token = session.token()?;
    let appointments = session.api().appointments_for(&token, role)?;
    tracing::debug!(%role, count = appointments.len(), "Listed appointments");
    Ok(appointments)
}

/// One appointment plus its counterpart.
///
/// A populated reference is used as-is. A bare id is resolved through the
/// doctor or patient endpoint.
pub fn detail<S: CredentialStore, T: Transport>(
    session: &Session<S, T>,
    appointment_id: &str,
    viewer: Role,
) -> Result<AppointmentDetail, ClientError> {
    let token = session.token()?;
    let api = session.api();
    let appointment = api.appointment(&token, appointment_id)?;

    let counterpart = match (viewer, counterpart_ref(&appointment, viewer)) {
        (Role::Doctor, PartyRef::Populated(party)) => Counterpart {
            id: party.id.clone(),
            name: party.name.clone(),
            role: Role::Patient,
            detail: party.email.clone(),
        },
        (Role::Patient, PartyRef::Populated(party)) => Counterpart {
            id: party.id.clone(),
            name: party.name.clone(),
            role: Role::Doctor,
            detail: party.specialization.clone(),
        },
        (Role::Doctor, PartyRef::Id(id)) => {
            let patient = api.patient(&token, id)?;
            Counterpart {
                id: patient.id,
                name: patient.name,
                role: Role::Patient,
                detail: patient.email,
            }
        }
        (Role::Patient, PartyRef::Id(id)) => {
            let doctor = api.doctor(&token, id)?;
            Counterpart {
                id: doctor.id,
                name: doctor.name,
                role: Role::Doctor,
                detail: doctor.specialization,
            }
        }
    };

    Ok(AppointmentDetail {
        appointment,
        counterpart,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    Requested,
    Dismissed,
}

/// Cancel after confirmation. Dismissal issues no request; nothing is
/// updated locally, so callers re-fetch to see the new status.
pub fn cancel<S: CredentialStore, T: Transport, P: ConfirmPrompt + ?Sized>(
    session: &Session<S, T>,
    appointment_id: &str,
    prompt: &P,
) -> Result<CancelOutcome, ClientError> {
    if !prompt.confirm("Are you sure you want to cancel this appointment?") {
        tracing::debug!(appointment_id, "Cancellation dismissed");
        return Ok(CancelOutcome::Dismissed);
    }
    let token = session.token()?;
    session
        .api()
        .update_status(&token, appointment_id, AppointmentStatus::Cancelled)?;
    tracing::info!(appointment_id, "Appointment cancellation requested");
    Ok(CancelOutcome::Requested)
}
