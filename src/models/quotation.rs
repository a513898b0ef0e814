//! Quotation model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use super::ids::QuotationId;
use super::lenient::{option_number, string_list};
use super::user::UserRef;
use super::validation::{require, Record, RecordValidationError};
use super::visit::Facility;
use super::DataType;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuotationStatus {
    #[default]
    Pending,
    Responded,
    Accepted,
    Rejected,
}

impl fmt::Display for QuotationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "Pending"),
            Self::Responded => write!(f, "Responded"),
            Self::Accepted => write!(f, "Accepted"),
            Self::Rejected => write!(f, "Rejected"),
        }
    }
}

/// The admin's answer to a quotation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminResponse {
    pub message: String,

    #[serde(
        default,
        deserialize_with = "option_number::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub quoted_price: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responded_at: Option<DateTime<Utc>>,
}

impl AdminResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            quoted_price: None,
            responded_at: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quotation {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<QuotationId>,

    pub facility: Facility,

    #[serde(default, deserialize_with = "string_list::deserialize")]
    pub equipment_required: Vec<String>,

    #[serde(
        default,
        deserialize_with = "option_number::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub quantity: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urgency: Option<String>,

    #[serde(default)]
    pub status: QuotationStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_response: Option<AdminResponse>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested_by: Option<UserRef>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Record for Quotation {
    const DATA_TYPE: DataType = DataType::Quotations;

    fn validate(&self) -> Result<(), RecordValidationError> {
        require(&self.facility.name, "facility.name")?;

        if self.equipment_required.iter().all(|e| e.trim().is_empty()) {
            return Err(RecordValidationError::MissingField("equipmentRequired"));
        }
        if self.quantity == Some(0) {
            return Err(RecordValidationError::InvalidValue {
                field: "quantity",
                reason: "must be at least 1".into(),
            });
        }
        if let Some(price) = self.admin_response.as_ref().and_then(|r| r.quoted_price) {
            if !price.is_finite() || price < 0.0 {
                return Err(RecordValidationError::InvalidValue {
                    field: "adminResponse.quotedPrice",
                    reason: format!("{} is not a valid price", price),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize() {
        let quotation: Quotation = serde_json::from_value(json!({
            "_id": "q1",
            "facility": {"name": "Mercy Clinic", "location": "Kisumu"},
            "equipmentRequired": ["Ultrasound", "ECG"],
            "quantity": 2,
            "status": "responded",
            "adminResponse": {"message": "Quote sent", "quotedPrice": 4500.5},
            "requestedBy": "u1"
        }))
        .unwrap();
        assert_eq!(quotation.status, QuotationStatus::Responded);
        assert_eq!(
            quotation.admin_response.as_ref().and_then(|r| r.quoted_price),
            Some(4500.5)
        );
        assert!(quotation.validate().is_ok());
    }

    #[test]
    fn test_requires_equipment() {
        let quotation: Quotation = serde_json::from_value(json!({
            "facility": {"name": "Mercy"},
            "equipmentRequired": [" "]
        }))
        .unwrap();
        assert_eq!(
            quotation.validate(),
            Err(RecordValidationError::MissingField("equipmentRequired"))
        );
    }

    #[test]
    fn test_rejects_zero_quantity() {
        let quotation: Quotation = serde_json::from_value(json!({
            "facility": {"name": "Mercy"},
            "equipmentRequired": ["ECG"],
            "quantity": 0
        }))
        .unwrap();
        assert!(quotation.validate().is_err());
    }
}
