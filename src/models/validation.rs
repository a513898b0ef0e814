//! Record validation shared by every entity
//!
//! Bulk input is checked against the typed model for its data type before
//! any request is sent.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt;

use super::call_log::CallLog;
use super::data_type::DataType;
use super::document::MachineDocument;
use super::machine::Machine;
use super::quotation::Quotation;
use super::report::WeeklyReport;
use super::service_request::ServiceRequest;
use super::visit::Visit;
use crate::error::FieldSalesError;

/// Validation errors for record payloads
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordValidationError {
    MissingField(&'static str),
    InvalidValue { field: &'static str, reason: String },
    DateOrder { start: &'static str, end: &'static str },
}

impl fmt::Display for RecordValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "Missing required field '{}'", field),
            Self::InvalidValue { field, reason } => {
                write!(f, "Invalid value for '{}': {}", field, reason)
            }
            Self::DateOrder { start, end } => {
                write!(f, "'{}' must not be after '{}'", start, end)
            }
        }
    }
}

impl std::error::Error for RecordValidationError {}

impl From<RecordValidationError> for FieldSalesError {
    fn from(err: RecordValidationError) -> Self {
        FieldSalesError::Validation(err.to_string())
    }
}

/// Fails with `MissingField` when the value is blank
pub(crate) fn require(value: &str, field: &'static str) -> Result<(), RecordValidationError> {
    if value.trim().is_empty() {
        Err(RecordValidationError::MissingField(field))
    } else {
        Ok(())
    }
}

/// A typed backend record
pub trait Record: Serialize + DeserializeOwned {
    const DATA_TYPE: DataType;

    /// Check invariants the backend would reject
    fn validate(&self) -> Result<(), RecordValidationError>;

    /// Fill fields the backend expects but which can be derived locally
    fn normalize(&mut self) {}
}

fn check<R: Record>(payload: &Value) -> Result<Value, String> {
    let mut record: R = serde_json::from_value(payload.clone()).map_err(|e| e.to_string())?;
    record.normalize();
    record.validate().map_err(|e| e.to_string())?;
    serde_json::to_value(&record).map_err(|e| e.to_string())
}

/// Validate a raw payload against the model for its data type.
///
/// Returns the normalized payload to send, or the reason it was rejected.
pub fn validate_payload(data_type: DataType, payload: &Value) -> Result<Value, String> {
    if !payload.is_object() {
        return Err(format!("Expected a JSON object, found {}", kind_of(payload)));
    }
    match data_type {
        DataType::Visits => check::<Visit>(payload),
        DataType::Machines => check::<Machine>(payload),
        DataType::Documents => check::<MachineDocument>(payload),
        DataType::ServiceRequests => check::<ServiceRequest>(payload),
        DataType::CallLogs => check::<CallLog>(payload),
        DataType::Reports => check::<WeeklyReport>(payload),
        DataType::Quotations => check::<Quotation>(payload),
    }
}

pub(crate) fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rejects_non_objects() {
        let err = validate_payload(DataType::Visits, &json!([1, 2])).unwrap_err();
        assert!(err.contains("an array"));
    }

    #[test]
    fn test_visit_missing_client() {
        let err = validate_payload(
            DataType::Visits,
            &json!({"client": {"name": " "}, "visitDate": "2025-10-01"}),
        )
        .unwrap_err();
        assert!(err.contains("client.name"));
    }

    #[test]
    fn test_call_log_gets_week_tags() {
        let normalized = validate_payload(
            DataType::CallLogs,
            &json!({"clientName": "City Clinic", "callDate": "2025-10-01"}),
        )
        .unwrap();
        assert_eq!(normalized["week"], json!(40));
        assert_eq!(normalized["month"], json!(10));
        assert_eq!(normalized["year"], json!(2025));
    }

    #[test]
    fn test_unknown_fields_are_kept() {
        let normalized = validate_payload(
            DataType::Quotations,
            &json!({
                "facility": {"name": "Mercy"},
                "equipmentRequired": ["Ultrasound"],
                "priority": "high"
            }),
        )
        .unwrap();
        assert_eq!(normalized["priority"], json!("high"));
    }

    #[test]
    fn test_error_message() {
        let err = RecordValidationError::DateOrder {
            start: "weekStart",
            end: "weekEnd",
        };
        assert_eq!(err.to_string(), "'weekStart' must not be after 'weekEnd'");
        let converted: FieldSalesError = err.into();
        assert!(converted.is_validation());
    }
}
