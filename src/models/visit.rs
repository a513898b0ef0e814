//! Visit model
//!
//! A sales visit to a facility, with the people met and the equipment
//! discussed. Visits are the main input of weekly reports and of the
//! per-employee summary.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use super::dates::flexible_date;
use super::lenient::{flag, option_number, option_text, string_list, text};
use super::ids::VisitId;
use super::user::UserRef;
use super::validation::{require, Record, RecordValidationError};
use super::DataType;

/// A facility as embedded in visits, machines and quotations
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Facility {
    #[serde(default, deserialize_with = "text::deserialize")]
    pub name: String,

    /// Hospital, clinic, laboratory...
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub facility_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Facility {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Case-insensitive key used to recognise the same facility across records
    pub fn key(&self) -> String {
        self.name.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
    }
}

/// A person met during a visit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    #[serde(default, deserialize_with = "text::deserialize")]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    #[serde(
        default,
        deserialize_with = "option_text::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub phone: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl fmt::Display for Contact {
    /// "name (role) - phone", omitting the parts that are missing
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if let Some(role) = self.role.as_deref().filter(|r| !r.is_empty()) {
            write!(f, " ({})", role)?;
        }
        if let Some(phone) = self.phone.as_deref().filter(|p| !p.is_empty()) {
            write!(f, " - {}", phone)?;
        }
        Ok(())
    }
}

/// A sales visit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Visit {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<VisitId>,

    pub client: Facility,

    #[serde(with = "flexible_date")]
    pub visit_date: NaiveDate,

    #[serde(default)]
    pub contacts: Vec<Contact>,

    #[serde(default, deserialize_with = "string_list::deserialize")]
    pub equipment_discussed: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<String>,

    /// Estimated deal value
    #[serde(
        default,
        deserialize_with = "option_number::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub potential_value: Option<f64>,

    #[serde(default, deserialize_with = "flag::deserialize")]
    pub follow_up_required: bool,

    #[serde(default, deserialize_with = "string_list::deserialize")]
    pub follow_up_actions: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserRef>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Visit {
    pub fn new(client: Facility, visit_date: NaiveDate) -> Self {
        Self {
            id: None,
            client,
            visit_date,
            contacts: Vec::new(),
            equipment_discussed: Vec::new(),
            purpose: None,
            outcome: None,
            potential_value: None,
            follow_up_required: false,
            follow_up_actions: Vec::new(),
            notes: None,
            user: None,
            created_at: None,
            extra: Map::new(),
        }
    }
}

impl Record for Visit {
    const DATA_TYPE: DataType = DataType::Visits;

    fn validate(&self) -> Result<(), RecordValidationError> {
        require(&self.client.name, "client.name")?;

        if let Some(value) = self.potential_value {
            if !value.is_finite() || value < 0.0 {
                return Err(RecordValidationError::InvalidValue {
                    field: "potentialValue",
                    reason: format!("{} is not a non-negative amount", value),
                });
            }
        }

        for contact in &self.contacts {
            require(&contact.name, "contacts.name")?;
        }

        Ok(())
    }
}
