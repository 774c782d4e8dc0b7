use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicalCertificate {
    #[serde(alias = "_id")]
    pub id: String,
    pub appointment_id: String,
    pub reason: String,
    pub start_date: String,
    pub end_date: String,
    #[serde(default)]
    pub recommendations: Option<String>,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub verified_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateDraft {
    pub reason: String,
    /// `YYYY-MM-DD`
    pub start_date: String,
    /// `YYYY-MM-DD`
    pub end_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<String>,
}

impl CertificateDraft {
    pub fn validate(&self) -> Result<(), String> {
        if self.reason.trim().is_empty() {
            return Err("Certificate reason is required".into());
        }
        let start = NaiveDate::parse_from_str(&self.start_date, "%Y-%m-%d")
            .map_err(|_| "Invalid start date. Use YYYY-MM-DD")?;
        let end = NaiveDate::parse_from_str(&self.end_date, "%Y-%m-%d")
            .map_err(|_| "Invalid end date. Use YYYY-MM-DD")?;
        if end < start {
            return Err("End date is before start date".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(start: &str, end: &str) -> CertificateDraft {
        CertificateDraft {
            reason: "Acute bronchitis".into(),
            start_date: start.into(),
            end_date: end.into(),
            recommendations: None,
        }
    }

    #[test]
    fn valid_range_accepted() {
        assert!(draft("2024-01-05", "2024-01-09").validate().is_ok());
        assert!(draft("2024-01-05", "2024-01-05").validate().is_ok());
    }

    #[test]
    fn inverted_range_rejected() {
        assert_eq!(
            draft("2024-01-09", "2024-01-05").validate().unwrap_err(),
            "End date is before start date"
        );
    }

    #[test]
    fn malformed_date_rejected() {
        assert!(draft("05/01/2024", "2024-01-09").validate().is_err());
    }
}
