//! Clinical record panels attached to an appointment.
//!
//! A panel loads the appointment's record once, then saves by branching on
//! what the load found: no record → create (POST), existing record → update
//! (PUT to its id). Approval is one-way; there is no un-approve.

use std::fmt::Debug;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::api::Transport;
use crate::credentials::CredentialStore;
use crate::error::ClientError;
use crate::models::{
    CertificateDraft, Diagnosis, DiagnosisDraft, MedicalCertificate, Prescription,
    PrescriptionDraft, Receipt, ReceiptDraft,
};
use crate::session::Session;

/// A verifiable record stored in its own backend collection.
pub trait ClinicalRecord: DeserializeOwned + Debug + Clone {
    type Draft: Serialize + Debug;

    /// Collection path, e.g. `/api/prescriptions`.
    const COLLECTION: &'static str;
    /// Human label used in logs and messages.
    const LABEL: &'static str;

    fn id(&self) -> &str;
    fn is_verified(&self) -> bool;
    fn mark_verified(&mut self, at: DateTime<Utc>);
    fn validate_draft(draft: &Self::Draft) -> Result<(), String>;
}

macro_rules! clinical_record {
    ($record:ty, $draft:ty, $collection:literal, $label:literal) => {
        impl ClinicalRecord for $record {
            type Draft = $draft;
            const COLLECTION: &'static str = $collection;
            const LABEL: &'static str = $label;

            fn id(&self) -> &str {
                &self.id
            }

            fn is_verified(&self) -> bool {
                self.is_verified
            }

            fn mark_verified(&mut self, at: DateTime<Utc>) {
                self.is_verified = true;
                self.verified_at.get_or_insert(at);
            }

            fn validate_draft(draft: &Self::Draft) -> Result<(), String> {
                draft.validate()
            }
        }
    };
}

clinical_record!(Prescription, PrescriptionDraft, "/api/prescriptions", "prescription");
clinical_record!(
    MedicalCertificate,
    CertificateDraft,
    "/api/medical-certificates",
    "medical certificate"
);
clinical_record!(Receipt, ReceiptDraft, "/api/receipts", "receipt");

// ═══════════════════════════════════════════════════════════
// Record panel
// ═══════════════════════════════════════════════════════════

/// What `approve` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApproveOutcome {
    Verified,
    AlreadyVerified,
}

/// Loaded state of one record kind for one appointment.
#[derive(Debug, Clone)]
pub struct RecordPanel<R> {
    appointment_id: String,
    record: Option<R>,
}

impl<R: ClinicalRecord> RecordPanel<R> {
    /// Fetch the appointment's record; 404 or `null` means none yet.
    pub fn load<S: CredentialStore, T: Transport>(
        session: &Session<S, T>,
        appointment_id: &str,
    ) -> Result<Self, ClientError> {
        let token = session.token()?;
        let record = session.api().record::<R>(&token, appointment_id)?;
        tracing::debug!(
            appointment_id,
            kind = R::LABEL,
            found = record.is_some(),
            "Loaded record panel"
        );
        Ok(Self {
            appointment_id: appointment_id.to_string(),
            record,
        })
    }

    pub fn appointment_id(&self) -> &str {
        &self.appointment_id
    }

    pub fn record(&self) -> Option<&R> {
        self.record.as_ref()
    }

    pub fn is_verified(&self) -> bool {
        self.record.as_ref().is_some_and(R::is_verified)
    }

    /// Create or update, depending on whether the load found a record.
    pub fn save<S: CredentialStore, T: Transport>(
        &mut self,
        session: &Session<S, T>,
        draft: &R::Draft,
    ) -> Result<&R, ClientError> {
        R::validate_draft(draft).map_err(ClientError::Validation)?;
        let token = session.token()?;
        let api = session.api();

        let saved = match &self.record {
            None => {
                let created = api.create_record::<R>(&token, &self.appointment_id, draft)?;
                tracing::info!(
                    appointment_id = %self.appointment_id,
                    record_id = created.id(),
                    kind = R::LABEL,
                    "Record created"
                );
                created
            }
            Some(existing) => {
                let updated = api.update_record::<R>(&token, existing.id(), draft)?;
                tracing::info!(record_id = updated.id(), kind = R::LABEL, "Record updated");
                updated
            }
        };
        Ok(self.record.insert(saved))
    }

    /// Mark the saved record as verified.
    pub fn approve<S: CredentialStore, T: Transport>(
        &mut self,
        session: &Session<S, T>,
    ) -> Result<ApproveOutcome, ClientError> {
        let Some(record) = self.record.as_ref() else {
            return Err(ClientError::Validation(format!(
                "Save the {} before approving it",
                R::LABEL
            )));
        };
        if record.is_verified() {
            return Ok(ApproveOutcome::AlreadyVerified);
        }

        let token = session.token()?;
        let mut verified = match session.api().verify_record::<R>(&token, record.id())? {
            Some(echoed) => echoed,
            None => record.clone(),
        };
        verified.mark_verified(Utc::now());
        tracing::info!(record_id = verified.id(), kind = R::LABEL, "Record approved");
        self.record = Some(verified);
        Ok(ApproveOutcome::Verified)
    }
}

// ═══════════════════════════════════════════════════════════
// Diagnosis panel
// ═══════════════════════════════════════════════════════════

/// The diagnosis lives on the appointment itself, so saving is always an upsert.
#[derive(Debug, Clone)]
pub struct DiagnosisPanel {
    appointment_id: String,
    diagnosis: Option<Diagnosis>,
}

impl DiagnosisPanel {
    pub fn load<S: CredentialStore, T: Transport>(
        session: &Session<S, T>,
        appointment_id: &str,
    ) -> Result<Self, ClientError> {
        let token = session.token()?;
        let diagnosis = session.api().diagnosis(&token, appointment_id)?;
        Ok(Self {
            appointment_id: appointment_id.to_string(),
            diagnosis,
        })
    }

    pub fn appointment_id(&self) -> &str {
        &self.appointment_id
    }

    pub fn diagnosis(&self) -> Option<&Diagnosis> {
        self.diagnosis.as_ref()
    }

    pub fn save<S: CredentialStore, T: Transport>(
        &mut self,
        session: &Session<S, T>,
        draft: &DiagnosisDraft,
    ) -> Result<&Diagnosis, ClientError> {
        draft.validate().map_err(ClientError::Validation)?;
        let token = session.token()?;
        let saved = session
            .api()
            .save_diagnosis(&token, &self.appointment_id, draft)?;
        tracing::info!(appointment_id = %self.appointment_id, "Diagnosis saved");
        Ok(self.diagnosis.insert(saved))
    }
}
