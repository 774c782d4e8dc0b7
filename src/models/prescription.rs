use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Medication {
    pub name: String,
    pub dosage: String,
    pub frequency: String,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub instructions: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prescription {
    #[serde(alias = "_id")]
    pub id: String,
    pub appointment_id: String,
    pub medications: Vec<Medication>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub verified_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrescriptionDraft {
    pub medications: Vec<Medication>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl PrescriptionDraft {
    pub fn validate(&self) -> Result<(), String> {
        if self.medications.is_empty() {
            return Err("At least one medication is required".into());
        }
        for (i, med) in self.medications.iter().enumerate() {
            if med.name.trim().is_empty() {
                return Err(format!("Medication {} has no name", i + 1));
            }
            if med.dosage.trim().is_empty() {
                return Err(format!("Medication '{}' has no dosage", med.name));
            }
            if med.frequency.trim().is_empty() {
                return Err(format!("Medication '{}' has no frequency", med.name));
            }
        }
        Ok(())
    }
}
