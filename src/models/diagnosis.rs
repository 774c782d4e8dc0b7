use serde::{Deserialize, Serialize};

/// Diagnosis recorded by the doctor on one appointment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnosis {
    #[serde(default, alias = "_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub appointment_id: Option<String>,
    pub diagnosis: String,
    #[serde(default)]
    pub notes: Option<String>,
    /// Decoded for parity with the other records; nothing verifies a diagnosis.
    #[serde(default)]
    pub is_verified: bool,
}

/// Body of `PUT /api/appointments/diagnosis/:id`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosisDraft {
    pub diagnosis: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl DiagnosisDraft {
    pub fn validate(&self) -> Result<(), String> {
        if self.diagnosis.trim().is_empty() {
            return Err("Diagnosis is required".into());
        }
        if self.diagnosis.len() > 5000 {
            return Err("Diagnosis too long (max 5000 chars)".into());
        }
        Ok(())
    }
}
