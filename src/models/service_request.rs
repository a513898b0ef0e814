//! Service request model

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use super::dates::option_flexible_date;
use super::ids::{MachineId, ServiceRequestId};
use super::user::UserRef;
use super::validation::{require, Record, RecordValidationError};
use super::visit::Facility;
use super::DataType;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ServiceStatus {
    #[default]
    Pending,
    Assigned,
    InProgress,
    Completed,
    Cancelled,
}

impl fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "Pending",
            Self::Assigned => "Assigned",
            Self::InProgress => "In progress",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        };
        f.write_str(s)
    }
}

/// The machine a request is about: populated or bare id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MachineRef {
    Populated {
        #[serde(rename = "_id")]
        id: MachineId,
        #[serde(default)]
        model: String,
        #[serde(rename = "serialNumber", default)]
        serial_number: String,
    },
    Id(MachineId),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRequest {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ServiceRequestId>,

    pub facility: Facility,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub machine: Option<MachineRef>,

    #[serde(default)]
    pub issue: String,

    #[serde(default)]
    pub priority: Priority,

    #[serde(default)]
    pub status: ServiceStatus,

    #[serde(
        default,
        with = "option_flexible_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub request_date: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<UserRef>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ServiceRequest {
    pub fn is_open(&self) -> bool {
        !matches!(self.status, ServiceStatus::Completed | ServiceStatus::Cancelled)
    }
}

impl Record for ServiceRequest {
    const DATA_TYPE: DataType = DataType::ServiceRequests;

    fn validate(&self) -> Result<(), RecordValidationError> {
        require(&self.facility.name, "facility.name")?;
        require(&self.issue, "issue")?;
        if self.status != ServiceStatus::Pending && self.assigned_to.is_none() {
            return Err(RecordValidationError::InvalidValue {
                field: "assignedTo",
                reason: format!("required once the request is {}", self.status),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults_and_machine_ref() {
        let request: ServiceRequest = serde_json::from_value(json!({
            "facility": {"name": "Mercy Clinic"},
            "machine": {"_id": "m1", "model": "Vivid T8", "serialNumber": "SN-1"},
            "issue": "Probe not detected"
        }))
        .unwrap();
        assert_eq!(request.priority, Priority::Medium);
        assert_eq!(request.status, ServiceStatus::Pending);
        assert!(matches!(request.machine, Some(MachineRef::Populated { .. })));
        assert!(request.is_open());
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_status_wire_format() {
        let request: ServiceRequest = serde_json::from_value(json!({
            "facility": {"name": "Mercy"},
            "machine": "m2",
            "issue": "Noise",
            "status": "in-progress",
            "assignedTo": "u9"
        }))
        .unwrap();
        assert_eq!(request.status, ServiceStatus::InProgress);
        assert_eq!(request.machine, Some(MachineRef::Id(MachineId::new("m2"))));
    }

    #[test]
    fn test_progress_requires_engineer() {
        let request: ServiceRequest = serde_json::from_value(json!({
            "facility": {"name": "Mercy"},
            "issue": "Noise",
            "status": "assigned"
        }))
        .unwrap();
        assert!(matches!(
            request.validate(),
            Err(RecordValidationError::InvalidValue { field: "assignedTo", .. })
        ));
    }
}
