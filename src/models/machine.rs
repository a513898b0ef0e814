//! Machine model
//!
//! Installed equipment at a facility and its engineering service history.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::dates::{flexible_date, option_flexible_date};
use super::ids::MachineId;
use super::user::UserRef;
use super::validation::{require, Record, RecordValidationError};
use super::visit::{Contact, Facility};
use super::DataType;

/// One engineering service performed on a machine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineeringService {
    #[serde(with = "flexible_date")]
    pub date: NaiveDate,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engineer: Option<String>,

    /// Preventive, corrective, installation...
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// An installed machine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Machine {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<MachineId>,

    #[serde(default)]
    pub model: String,

    #[serde(default)]
    pub serial_number: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facility: Option<Facility>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_person: Option<Contact>,

    #[serde(
        default,
        with = "option_flexible_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub installed_date: Option<NaiveDate>,

    #[serde(
        default,
        with = "option_flexible_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_service_date: Option<NaiveDate>,

    #[serde(
        default,
        with = "option_flexible_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub next_service_date: Option<NaiveDate>,

    #[serde(default)]
    pub service_history: Vec<EngineeringService>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<UserRef>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Machine {
    /// Date of the most recent recorded service, if any
    pub fn latest_service(&self) -> Option<NaiveDate> {
        self.service_history
            .iter()
            .map(|s| s.date)
            .max()
            .or(self.last_service_date)
    }
}

impl Record for Machine {
    const DATA_TYPE: DataType = DataType::Machines;

    fn validate(&self) -> Result<(), RecordValidationError> {
        require(&self.model, "model")?;
        require(&self.serial_number, "serialNumber")?;

        if let (Some(installed), Some(serviced)) = (self.installed_date, self.last_service_date) {
            if installed > serviced {
                return Err(RecordValidationError::DateOrder {
                    start: "installedDate",
                    end: "lastServiceDate",
                });
            }
        }

        Ok(())
    }

    fn normalize(&mut self) {
        if self.last_service_date.is_none() {
            self.last_service_date = self.service_history.iter().map(|s| s.date).max();
        }
    }
}
