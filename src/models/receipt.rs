use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptItem {
    pub description: String,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    #[serde(alias = "_id")]
    pub id: String,
    pub appointment_id: String,
    pub items: Vec<ReceiptItem>,
    #[serde(default)]
    pub total: f64,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub verified_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptDraft {
    pub items: Vec<ReceiptItem>,
    /// Sum of item amounts; recomputed by `with_total`.
    #[serde(default)]
    pub total: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
}

impl ReceiptDraft {
    pub fn new(items: Vec<ReceiptItem>, payment_method: Option<String>) -> Self {
        Self {
            items,
            total: 0.0,
            payment_method,
        }
        .with_total()
    }

    /// Recompute `total` from the items.
    pub fn with_total(mut self) -> Self {
        self.total = self.items.iter().map(|item| item.amount).sum();
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.items.is_empty() {
            return Err("At least one receipt item is required".into());
        }
        for item in &self.items {
            if item.description.trim().is_empty() {
                return Err("Receipt item description is required".into());
            }
            if !item.amount.is_finite() || item.amount < 0.0 {
                return Err(format!("Invalid amount for '{}'", item.description));
            }
        }
        Ok(())
    }
}
