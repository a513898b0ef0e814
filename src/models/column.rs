//! Export column descriptors
//!
//! A column names a field of a record (a dotted path or a synthetic field),
//! the header label it is exported under, how its value is formatted, and a
//! fallback used when the record has no value.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use super::DataType;
use crate::error::{FieldSalesError, FieldSalesResult};

/// How a column's value is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    /// Plain string coercion
    #[default]
    Text,
    /// Timestamp or calendar date
    Date,
    /// List of values (contacts, equipment, actions)
    Array,
    /// Yes/No flag
    Boolean,
    /// Numeric value written as a number cell
    Number,
}

impl ColumnType {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "text" | "string" => Some(Self::Text),
            "date" | "datetime" => Some(Self::Date),
            "array" | "list" => Some(Self::Array),
            "boolean" | "bool" => Some(Self::Boolean),
            "number" | "numeric" => Some(Self::Number),
            _ => None,
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Date => write!(f, "date"),
            Self::Array => write!(f, "array"),
            Self::Boolean => write!(f, "boolean"),
            Self::Number => write!(f, "number"),
        }
    }
}

/// One exported column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec {
    /// Field key: dotted path (`user.firstName`) or synthetic field name
    pub key: String,
    /// Header label
    pub label: String,
    /// Formatting rule
    #[serde(rename = "type", default)]
    pub column_type: ColumnType,
    /// Value written when the record has none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

impl ColumnSpec {
    pub fn new(key: impl Into<String>, label: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            column_type,
            default: None,
        }
    }

    /// Set the fallback value
    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// A text column for a key nobody declared; the label is derived from the key
    pub fn dynamic(key: &str) -> Self {
        Self::new(key, label_from_key(key), ColumnType::Text)
    }
}

/// "user.firstName" -> "User First Name"
pub fn label_from_key(key: &str) -> String {
    let mut label = String::new();
    let mut prev_lower = false;
    for c in key.chars() {
        if c == '.' || c == '_' || c == '-' {
            if !label.ends_with(' ') && !label.is_empty() {
                label.push(' ');
            }
            prev_lower = false;
            continue;
        }
        if c.is_uppercase() && prev_lower {
            label.push(' ');
        }
        if label.is_empty() || label.ends_with(' ') {
            label.extend(c.to_uppercase());
        } else {
            label.push(c);
        }
        prev_lower = c.is_lowercase() || c.is_ascii_digit();
    }
    label
}

fn col(key: &str, label: &str, column_type: ColumnType) -> ColumnSpec {
    ColumnSpec::new(key, label, column_type)
}

/// The columns offered for a data type, in display order
pub fn available_columns(data_type: DataType) -> Vec<ColumnSpec> {
    use ColumnType::*;
    match data_type {
        DataType::Visits => vec![
            col("visitDate", "Visit Date", Date),
            col("userFullName", "Sales Rep", Text),
            col("client.name", "Client", Text),
            col("client.location", "Location", Text),
            col("client.type", "Facility Type", Text),
            col("contacts", "Contacts", Array),
            col("contactNames", "Contact Names", Text),
            col("contact1Name", "Contact 1 Name", Text),
            col("contact1Role", "Contact 1 Role", Text),
            col("contact1Phone", "Contact 1 Phone", Text),
            col("contact2Name", "Contact 2 Name", Text),
            col("contact2Role", "Contact 2 Role", Text),
            col("contact2Phone", "Contact 2 Phone", Text),
            col("equipmentDiscussed", "Equipment Discussed", Array),
            col("purpose", "Purpose", Text),
            col("outcome", "Outcome", Text),
            col("potentialValue", "Potential Value", Number),
            col("followUpRequired", "Follow-up Required", Boolean),
            col("followUpActions", "Follow-up Actions", Array),
            col("notes", "Notes", Text),
            col("createdAt", "Created At", Date),
        ],
        DataType::Machines => vec![
            col("model", "Model", Text),
            col("serialNumber", "Serial Number", Text),
            col("manufacturer", "Manufacturer", Text),
            col("facility.name", "Facility", Text),
            col("facility.location", "Location", Text),
            col("contactPerson.name", "Contact Person", Text),
            col("contactPerson.phone", "Contact Phone", Text),
            col("installedDate", "Installed", Date),
            col("lastServiceDate", "Last Service", Date),
            col("nextServiceDate", "Next Service", Date),
            col("serviceHistory", "Service History", Array),
        ],
        DataType::Documents => vec![
            col("title", "Title", Text),
            col("category", "Category", Text),
            col("manufacturer", "Manufacturer", Text),
            col("fileUrl", "File", Text),
            col("link", "Link", Text),
            col("createdAt", "Uploaded", Date),
        ],
        DataType::ServiceRequests => vec![
            col("facility.name", "Facility", Text),
            col("machine.model", "Machine", Text),
            col("machine.serialNumber", "Serial Number", Text),
            col("issue", "Issue", Text),
            col("priority", "Priority", Text),
            col("status", "Status", Text),
            col("userFullName", "Assigned Engineer", Text),
            col("createdAt", "Requested", Date),
        ],
        DataType::CallLogs => vec![
            col("callDate", "Call Date", Date),
            col("userFullName", "Agent", Text),
            col("clientName", "Client", Text),
            col("facility", "Facility", Text),
            col("phone", "Phone", Text),
            col("callType", "Call Type", Text),
            col("outcome", "Outcome", Text),
            col("followUpDate", "Follow-up Date", Date),
            col("notes", "Notes", Text),
            col("year", "Year", Number),
            col("month", "Month", Number),
            col("week", "Week", Number),
        ],
        DataType::Reports => vec![
            col("weekStart", "Week Start", Date),
            col("weekEnd", "Week End", Date),
            col("userFullName", "Sales Rep", Text),
            col("status", "Status", Text),
            col("content", "Summary", Text),
            col("challenges", "Challenges", Text),
            col("nextWeekPlan", "Next Week Plan", Text),
            col("adminNotes", "Admin Notes", Text),
            col("createdAt", "Submitted", Date),
        ],
        DataType::Quotations => vec![
            col("facility.name", "Facility", Text),
            col("facility.location", "Location", Text),
            col("userFullName", "Requested By", Text),
            col("equipmentRequired", "Equipment", Array),
            col("quantity", "Quantity", Number),
            col("urgency", "Urgency", Text),
            col("status", "Status", Text),
            col("adminResponse.message", "Response", Text),
            col("adminResponse.quotedPrice", "Quoted Price", Number),
            col("createdAt", "Requested", Date),
        ],
    }
}

/// The columns selected when the user picks none explicitly
pub fn default_columns(data_type: DataType) -> Vec<ColumnSpec> {
    let keys: &[&str] = match data_type {
        DataType::Visits => &[
            "visitDate",
            "userFullName",
            "client.name",
            "client.location",
            "contacts",
            "outcome",
            "potentialValue",
            "followUpRequired",
        ],
        DataType::Machines => &[
            "model",
            "serialNumber",
            "facility.name",
            "installedDate",
            "lastServiceDate",
            "nextServiceDate",
        ],
        DataType::Documents => &["title", "category", "manufacturer", "fileUrl", "link"],
        DataType::ServiceRequests => &["facility.name", "machine.model", "issue", "priority", "status"],
        DataType::CallLogs => &["callDate", "userFullName", "clientName", "phone", "outcome"],
        DataType::Reports => &["weekStart", "weekEnd", "userFullName", "status"],
        DataType::Quotations => &[
            "facility.name",
            "userFullName",
            "equipmentRequired",
            "status",
            "adminResponse.message",
        ],
    };
    select_columns(data_type, keys)
}

/// Resolve a key list against the catalogue; unknown keys become dynamic text columns
pub fn select_columns<S: AsRef<str>>(data_type: DataType, keys: &[S]) -> Vec<ColumnSpec> {
    let catalogue = available_columns(data_type);
    keys.iter()
        .map(|k| k.as_ref().trim())
        .filter(|k| !k.is_empty())
        .map(|key| {
            catalogue
                .iter()
                .find(|c| c.key == key)
                .cloned()
                .unwrap_or_else(|| ColumnSpec::dynamic(key))
        })
        .collect()
}

/// A saved column selection, stored as YAML or JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnPreset {
    /// Preset name
    pub name: String,
    /// Data type the preset applies to
    pub data_type: DataType,
    /// Ordered columns
    pub columns: Vec<ColumnSpec>,
}

impl ColumnPreset {
    /// Load a preset; the format follows the file extension (`.json`, else YAML)
    pub fn load(path: &Path) -> FieldSalesResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            FieldSalesError::Io(format!("Failed to read preset {}: {}", path.display(), e))
        })?;
        let preset: Self = if is_json(path) {
            serde_json::from_str(&contents)?
        } else {
            serde_yaml::from_str(&contents)?
        };
        preset.validate()?;
        Ok(preset)
    }

    /// Save a preset in the format given by the file extension
    pub fn save(&self, path: &Path) -> FieldSalesResult<()> {
        self.validate()?;
        let contents = if is_json(path) {
            serde_json::to_string_pretty(self)?
        } else {
            serde_yaml::to_string(self)?
        };
        std::fs::write(path, contents).map_err(|e| {
            FieldSalesError::Io(format!("Failed to write preset {}: {}", path.display(), e))
        })
    }

    pub fn validate(&self) -> FieldSalesResult<()> {
        if self.columns.is_empty() {
            return Err(FieldSalesError::Validation(format!(
                "Preset '{}' selects no columns",
                self.name
            )));
        }
        if let Some(column) = self.columns.iter().find(|c| c.key.trim().is_empty()) {
            return Err(FieldSalesError::Validation(format!(
                "Preset '{}' has a column with an empty key (label '{}')",
                self.name, column.label
            )));
        }
        Ok(())
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .map(|e| e.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_label_from_key() {
        assert_eq!(label_from_key("user.firstName"), "User First Name");
        assert_eq!(label_from_key("serial_number"), "Serial Number");
        assert_eq!(label_from_key("contact1Name"), "Contact1 Name");
    }

    #[test]
    fn test_select_known_and_unknown_keys() {
        let columns = select_columns(DataType::Visits, &["client.name", "custom.field"]);
        assert_eq!(columns.len(), 2);
        assert_eq!(columns[0].label, "Client");
        assert_eq!(columns[1].label, "Custom Field");
        assert_eq!(columns[1].column_type, ColumnType::Text);
    }

    #[test]
    fn test_default_columns_exist_in_catalogue() {
        for data_type in DataType::ALL {
            let catalogue = available_columns(data_type);
            for column in default_columns(data_type) {
                assert!(
                    catalogue.iter().any(|c| c.key == column.key),
                    "{} missing from {} catalogue",
                    column.key,
                    data_type
                );
            }
        }
    }

    #[test]
    fn test_preset_yaml_round_trip_on_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("visits.yaml");
        let preset = ColumnPreset {
            name: "Weekly visits".into(),
            data_type: DataType::Visits,
            columns: default_columns(DataType::Visits),
        };
        preset.save(&path).unwrap();

        let loaded = ColumnPreset::load(&path).unwrap();
        assert_eq!(loaded.data_type, DataType::Visits);
        assert_eq!(loaded.columns, preset.columns);
    }

    #[test]
    fn test_preset_from_handwritten_yaml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("calls.yml");
        std::fs::write(
            &path,
            "name: Calls\ndata_type: callLogs\ncolumns:\n  - key: clientName\n    label: Client\n  - key: callDate\n    label: Date\n    type: date\n",
        )
        .unwrap();
        let preset = ColumnPreset::load(&path).unwrap();
        assert_eq!(preset.columns[0].column_type, ColumnType::Text);
        assert_eq!(preset.columns[1].column_type, ColumnType::Date);
    }

    #[test]
    fn test_empty_preset_rejected() {
        let preset = ColumnPreset {
            name: "Empty".into(),
            data_type: DataType::Machines,
            columns: vec![],
        };
        assert!(preset.validate().unwrap_err().is_validation());
    }
}
